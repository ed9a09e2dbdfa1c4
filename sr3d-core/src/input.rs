/// Keys the renderer reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    W,
    A,
    S,
    D,
    Q,
    E,
    Space,
    Up,
    Down,
    Left,
    Right,
    Escape,
}

impl Key {
    pub const ALL: [Key; 12] = [
        Key::W,
        Key::A,
        Key::S,
        Key::D,
        Key::Q,
        Key::E,
        Key::Space,
        Key::Up,
        Key::Down,
        Key::Left,
        Key::Right,
        Key::Escape,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

/// Edge and level state of one key for the current frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyState {
    /// Went down this frame.
    pub pressed: bool,
    /// Went up this frame.
    pub released: bool,
    /// Is down.
    pub held: bool,
}

/// Services the host provides to the renderer: raw key and mouse state plus
/// the screen size. The renderer reads them once per frame through
/// [`FrameInput::poll`].
pub trait Platform {
    fn key(&self, key: Key) -> KeyState;
    fn mouse_position(&self) -> (i32, i32);
    /// Move the pointer; used to re-centre it for relative mouse look.
    fn set_cursor_position(&mut self, x: i32, y: i32);
    fn screen_size(&self) -> (u32, u32);
}

/// Snapshot of everything the controllers read in one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameInput {
    keys: [KeyState; Key::ALL.len()],
    pub mouse: (i32, i32),
    pub screen: (u32, u32),
}

impl FrameInput {
    pub fn poll<P: Platform + ?Sized>(platform: &P) -> Self {
        let mut input = Self {
            mouse: platform.mouse_position(),
            screen: platform.screen_size(),
            ..Self::default()
        };
        for key in Key::ALL {
            input.keys[key.index()] = platform.key(key);
        }
        input
    }

    pub fn key(&self, key: Key) -> KeyState {
        self.keys[key.index()]
    }

    pub fn held(&self, key: Key) -> bool {
        self.key(key).held
    }

    pub fn pressed(&self, key: Key) -> bool {
        self.key(key).pressed
    }

    /// Override a key, mostly for tests and scripted input.
    pub fn set(&mut self, key: Key, state: KeyState) {
        self.keys[key.index()] = state;
    }

    pub fn hold(mut self, key: Key) -> Self {
        self.set(
            key,
            KeyState {
                pressed: false,
                released: false,
                held: true,
            },
        );
        self
    }

    pub fn screen_center(&self) -> (i32, i32) {
        ((self.screen.0 / 2) as i32, (self.screen.1 / 2) as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fake {
        held: Vec<Key>,
    }

    impl Platform for Fake {
        fn key(&self, key: Key) -> KeyState {
            KeyState {
                held: self.held.contains(&key),
                ..KeyState::default()
            }
        }

        fn mouse_position(&self) -> (i32, i32) {
            (3, 4)
        }

        fn set_cursor_position(&mut self, _x: i32, _y: i32) {}

        fn screen_size(&self) -> (u32, u32) {
            (100, 50)
        }
    }

    #[test]
    fn test_poll_snapshots_platform() {
        let input = FrameInput::poll(&Fake {
            held: vec![Key::W, Key::Space],
        });
        assert!(input.held(Key::W));
        assert!(input.held(Key::Space));
        assert!(!input.held(Key::S));
        assert_eq!(input.mouse, (3, 4));
        assert_eq!(input.screen_center(), (50, 25));
    }

    #[test]
    fn test_key_indices_are_distinct() {
        let mut seen = [false; Key::ALL.len()];
        for key in Key::ALL {
            assert!(!seen[key.index()]);
            seen[key.index()] = true;
        }
    }
}
