/// Terminal host for the SR3D renderer
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, KeyboardEnhancementFlags, MouseEvent, MouseEventKind,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal,
};
use sr3d_core::{Application, Key, KeyState, Platform, Texture};
use std::collections::HashMap;
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

pub mod renderer;

pub use renderer::AsciiRenderer;

/// Without key-release reporting a key counts as held until no press or
/// repeat has been seen for this long.
const HOLD_TIMEOUT: Duration = Duration::from_millis(400);

#[derive(Debug, Clone, Copy)]
struct KeyTrack {
    state: KeyState,
    last_seen: Instant,
}

/// Keyboard, mouse and screen state fed by crossterm events.
pub struct TerminalInput {
    keys: HashMap<Key, KeyTrack>,
    /// Virtual pointer the renderer reads and re-centres.
    mouse: (i32, i32),
    /// Last cell the terminal reported the pointer in.
    pointer: Option<(i32, i32)>,
    size: (u32, u32),
    release_events: bool,
}

impl TerminalInput {
    pub fn new(width: u32, height: u32, release_events: bool) -> Self {
        Self {
            keys: HashMap::new(),
            mouse: ((width / 2) as i32, (height / 2) as i32),
            pointer: None,
            size: (width, height),
            release_events,
        }
    }

    pub fn handle_event(&mut self, event: &Event, now: Instant) {
        match event {
            Event::Key(key_event) => self.handle_key(key_event, now),
            Event::Mouse(MouseEvent {
                kind: MouseEventKind::Moved | MouseEventKind::Drag(_),
                column,
                row,
                ..
            }) => {
                let current = (*column as i32, *row as i32);
                // The terminal cannot warp the pointer, so movement is
                // applied as a delta on top of the virtual position.
                if let Some(last) = self.pointer {
                    self.mouse.0 += current.0 - last.0;
                    self.mouse.1 += current.1 - last.1;
                }
                self.pointer = Some(current);
            }
            Event::Resize(width, height) => {
                self.size = (*width as u32, *height as u32);
            }
            _ => {}
        }
    }

    fn handle_key(&mut self, event: &KeyEvent, now: Instant) {
        let Some(key) = map_key(event) else {
            return;
        };
        let track = self.keys.entry(key).or_insert(KeyTrack {
            state: KeyState::default(),
            last_seen: now,
        });
        match event.kind {
            KeyEventKind::Press | KeyEventKind::Repeat => {
                if !track.state.held {
                    track.state.pressed = true;
                }
                track.state.held = true;
                track.last_seen = now;
            }
            KeyEventKind::Release => {
                track.state.held = false;
                track.state.released = true;
            }
        }
    }

    /// Release keys whose hold has expired. Only needed when the terminal
    /// does not report releases.
    pub fn begin_frame(&mut self, now: Instant) {
        if self.release_events {
            return;
        }
        for track in self.keys.values_mut() {
            if track.state.held && now.duration_since(track.last_seen) > HOLD_TIMEOUT {
                track.state.held = false;
                track.state.released = true;
            }
        }
    }

    /// Clear the one-frame edges.
    pub fn end_frame(&mut self) {
        for track in self.keys.values_mut() {
            track.state.pressed = false;
            track.state.released = false;
        }
    }
}

impl Platform for TerminalInput {
    fn key(&self, key: Key) -> KeyState {
        self.keys.get(&key).map(|t| t.state).unwrap_or_default()
    }

    fn mouse_position(&self) -> (i32, i32) {
        self.mouse
    }

    fn set_cursor_position(&mut self, x: i32, y: i32) {
        self.mouse = (x, y);
    }

    fn screen_size(&self) -> (u32, u32) {
        self.size
    }
}

fn map_key(event: &KeyEvent) -> Option<Key> {
    if event.modifiers.contains(KeyModifiers::CONTROL) && event.code == KeyCode::Char('c') {
        return Some(Key::Escape);
    }
    let key = match event.code {
        KeyCode::Char(c) => match c.to_ascii_lowercase() {
            'w' => Key::W,
            'a' => Key::A,
            's' => Key::S,
            'd' => Key::D,
            'q' => Key::Q,
            'e' => Key::E,
            ' ' => Key::Space,
            _ => return None,
        },
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Esc => Key::Escape,
        _ => return None,
    };
    Some(key)
}

/// Runs an [`Application`] in the terminal
pub struct TerminalApp {
    input: TerminalInput,
    renderer: AsciiRenderer,
    target_frame_time: Duration,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new() -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        let release_events = terminal::supports_keyboard_enhancement().unwrap_or(false);
        Ok(Self::with_size(width, height, release_events))
    }

    pub fn with_size(width: u16, height: u16, release_events: bool) -> Self {
        Self {
            input: TerminalInput::new(width as u32, height as u32, release_events),
            renderer: AsciiRenderer::new(width as usize, height as usize),
            target_frame_time: Duration::from_millis(1000 / 30), // 30 FPS target
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        }
    }

    /// Make a texture available to the rasterizer.
    pub fn with_texture(mut self, texture: Texture) -> Self {
        self.renderer.register_texture(texture);
        self
    }

    /// Run `app` until it asks to stop. Returns `Ok(false)` without touching
    /// the terminal when the application refuses to start.
    pub fn run<A: Application>(&mut self, app: &mut A) -> io::Result<bool> {
        if !self.start(app) {
            return Ok(false);
        }

        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide, EnableMouseCapture)?;
        if self.input.release_events {
            execute!(
                stdout(),
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
        }

        let result = self.main_loop(app).map(|()| true);

        // Cleanup
        if self.input.release_events {
            execute!(stdout(), PopKeyboardEnhancementFlags)?;
        }
        terminal::disable_raw_mode()?;
        execute!(stdout(), DisableMouseCapture, terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    fn start<A: Application>(&mut self, app: &mut A) -> bool {
        if !app.on_create(&mut self.input) {
            warn!("application refused to start");
            return false;
        }
        info!(
            width = self.input.size.0,
            height = self.input.size.1,
            release_events = self.input.release_events,
            "terminal host started"
        );
        true
    }

    fn main_loop<A: Application>(&mut self, app: &mut A) -> io::Result<()> {
        let mut previous = Instant::now();
        loop {
            let frame_start = Instant::now();

            // Handle input
            while event::poll(Duration::from_millis(0))? {
                let event = event::read()?;
                self.input.handle_event(&event, frame_start);
                if let Event::Resize(width, height) = event {
                    self.renderer.resize(width as usize, height as usize);
                    debug!(width, height, "terminal resized");
                }
            }
            self.input.begin_frame(frame_start);

            // Update and render
            let elapsed = frame_start.duration_since(previous).as_secs_f32();
            previous = frame_start;
            self.renderer.clear();
            let running = app.on_update(&mut self.input, &mut self.renderer, elapsed);
            self.input.end_frame();
            self.present()?;

            if !running {
                break;
            }

            // Frame timing
            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < self.target_frame_time {
                std::thread::sleep(self.target_frame_time - elapsed);
            }

            // Update FPS counter
            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        app.on_destroy();
        info!("terminal host stopped");
        Ok(())
    }

    fn present(&mut self) -> io::Result<()> {
        let mut stdout = stdout();
        self.renderer.draw(&mut stdout)?;

        // Draw UI overlay
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "SR3D Terminal Renderer | FPS: {:.1} | WASD=Move Space=Jump Arrows/Mouse=Look Esc=Quit",
                self.fps
            )),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}
