use crate::{ButtonState, Key};

/// Number of tracked key codes.
pub const KEY_COUNT: usize = 512;

/// Keyboard state for the current and previous frame.
#[derive(Debug, Clone)]
pub struct Keyboard {
    keys: [ButtonState; KEY_COUNT],
}

impl Default for Keyboard {
    fn default() -> Self {
        Self {
            keys: [ButtonState::default(); KEY_COUNT],
        }
    }
}

impl Keyboard {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self, key: Key) -> ButtonState {
        self.keys.get(key.index()).copied().unwrap_or_default()
    }

    pub fn key_down(&self, key: Key) -> bool {
        self.state(key).down()
    }

    pub fn key_pressed(&self, key: Key) -> bool {
        self.state(key).pressed()
    }

    pub fn key_released(&self, key: Key) -> bool {
        self.state(key).released()
    }

    /// Ages every key; call once per frame after the frame has been handled.
    pub fn update(&mut self) {
        for key in &mut self.keys {
            key.age();
        }
    }

    pub fn on_key(&mut self, key: Key, down: bool) {
        match self.keys.get_mut(key.index()) {
            Some(state) => state.set(down),
            None => tracing::debug!(code = key.0, "ignoring out-of-range key code"),
        }
    }
}
