/// Application lifecycle and the renderer application.
///
/// A host drives an [`Application`] with three callbacks: `on_create` once
/// before the first frame, `on_update` every frame until it returns `false`,
/// and `on_destroy` on the way out. [`Renderer`] is the application that
/// owns the scene and runs the pipeline.

use tracing::{debug, info, warn};

use crate::camera::{CameraController, CameraState, MouseLook, NudgeController, PhysicsController};
use crate::config::{CameraModel, RendererConfig};
use crate::decal::{DecalSink, Texture, Tint};
use crate::geometry::Mesh;
use crate::input::{FrameInput, Key, Platform};
use crate::obj::load_mesh_or_empty;
use crate::pipeline::{FrameStats, Pipeline};
use crate::transform::{RotationState, Transform};

/// Callbacks a host invokes over an application's lifetime.
pub trait Application {
    /// Load resources. Returning `false` aborts startup.
    fn on_create(&mut self, platform: &mut dyn Platform) -> bool;

    /// Advance and draw one frame. Returning `false` stops the loop.
    fn on_update(&mut self, platform: &mut dyn Platform, sink: &mut dyn DecalSink, elapsed: f32) -> bool;

    fn on_destroy(&mut self) -> bool {
        true
    }
}

pub fn controller_for(model: CameraModel) -> Box<dyn CameraController> {
    match model {
        CameraModel::Nudge => Box::new(NudgeController::default()),
        CameraModel::Physics => Box::new(PhysicsController::default()),
    }
}

const HUD_TINT: Tint = Tint::rgba(255, 255, 0, 255);

pub struct Renderer {
    config: RendererConfig,
    mesh: Mesh,
    texture: Option<Texture>,
    camera: CameraState,
    controller: Box<dyn CameraController>,
    mouse_look: Option<MouseLook>,
    rotation: RotationState,
    pipeline: Pipeline,
    input: FrameInput,
    stats: FrameStats,
}

impl Renderer {
    pub fn new(config: RendererConfig) -> Self {
        Self {
            controller: controller_for(config.camera_model),
            mouse_look: config.mouse_look.then(MouseLook::default),
            pipeline: Pipeline::new(&config),
            config,
            mesh: Mesh::new(),
            texture: None,
            camera: CameraState::default(),
            rotation: RotationState::zero(),
            input: FrameInput::default(),
            stats: FrameStats::default(),
        }
    }

    /// Texture applied to every triangle. The renderer owns it for its whole
    /// lifetime.
    pub fn with_texture(mut self, texture: Texture) -> Self {
        self.texture = Some(texture);
        self
    }

    /// Replace the default mouse-look tuning; `None` turns it off.
    pub fn with_mouse_look(mut self, look: Option<MouseLook>) -> Self {
        self.mouse_look = look;
        self
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn camera(&self) -> &CameraState {
        &self.camera
    }

    pub fn controller_name(&self) -> &'static str {
        self.controller.name()
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    pub fn set_camera_model(&mut self, model: CameraModel) {
        if self.config.camera_model != model {
            self.config.camera_model = model;
            self.controller = controller_for(model);
            info!(controller = self.controller.name(), "camera controller changed");
        }
    }

    /// Follow a change of screen size.
    pub fn resize(&mut self, width: u32, height: u32) {
        if (width, height) == (self.config.width, self.config.height) || width < 2 || height < 2 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.pipeline.resize(&self.config);
        debug!(width, height, "viewport resized");
    }

    /// Camera readout drawn over the scene.
    pub fn hud_lines(&self) -> [String; 4] {
        [
            format!("pos {:.2} {:.2} {:.2}", self.camera.position.x, self.camera.position.y, self.camera.position.z),
            format!("vel {:.2} {:.2} {:.2}", self.camera.velocity.x, self.camera.velocity.y, self.camera.velocity.z),
            format!(
                "acc {:.2} {:.2} {:.2}",
                self.camera.acceleration.x, self.camera.acceleration.y, self.camera.acceleration.z
            ),
            format!("mouse {} {}", self.input.mouse.0, self.input.mouse.1),
        ]
    }
}

impl Application for Renderer {
    fn on_create(&mut self, platform: &mut dyn Platform) -> bool {
        let (width, height) = platform.screen_size();
        self.resize(width, height);

        self.mesh = match &self.config.mesh_path {
            Some(path) => {
                let mesh = load_mesh_or_empty(path);
                if mesh.is_empty() {
                    warn!(path = %path.display(), "no triangles to render");
                    return false;
                }
                mesh
            }
            None => Mesh::cube(2.0),
        };

        let handle = self.texture.as_ref().map(Texture::handle);
        self.mesh = std::mem::take(&mut self.mesh).with_texture(handle);
        self.pipeline.reserve(self.mesh.len());

        info!(
            triangles = self.mesh.len(),
            textured = handle.is_some(),
            controller = self.controller.name(),
            "renderer created"
        );
        true
    }

    fn on_update(&mut self, platform: &mut dyn Platform, sink: &mut dyn DecalSink, elapsed: f32) -> bool {
        self.input = FrameInput::poll(platform);
        self.resize(self.input.screen.0, self.input.screen.1);

        if let Some(look) = &self.mouse_look {
            if let Some((x, y)) = look.apply(&mut self.camera, &self.input) {
                platform.set_cursor_position(x, y);
            }
        }
        self.controller.update(&mut self.camera, &self.input, elapsed);

        self.rotation.rotate(0.0, self.config.spin_speed * elapsed, 0.0);
        let world = Transform::world_matrix(&self.rotation, &self.config.offset());

        self.stats = self.pipeline.render(&self.mesh, &world, &self.camera, sink);

        for (row, line) in self.hud_lines().iter().enumerate() {
            sink.draw_string(1.0, 1.0 + row as f32, line, HUD_TINT);
        }

        !self.input.pressed(Key::Escape)
    }

    fn on_destroy(&mut self) -> bool {
        info!("renderer destroyed");
        true
    }
}
