use crate::{ButtonState, MouseButton};

/// Number of tracked mouse buttons.
pub const BUTTON_COUNT: usize = 8;

/// Cursor position and button state for the current and previous frame.
#[derive(Debug, Clone, Default)]
pub struct Mouse {
    x: i32,
    y: i32,
    buttons: [ButtonState; BUTTON_COUNT],
}

impl Mouse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn y(&self) -> i32 {
        self.y
    }

    fn state(&self, button: MouseButton) -> ButtonState {
        self.buttons
            .get(button.index())
            .copied()
            .unwrap_or_default()
    }

    pub fn button_down(&self, button: MouseButton) -> bool {
        self.state(button).down()
    }

    pub fn button_pressed(&self, button: MouseButton) -> bool {
        self.state(button).pressed()
    }

    pub fn button_released(&self, button: MouseButton) -> bool {
        self.state(button).released()
    }

    pub fn update(&mut self) {
        for button in &mut self.buttons {
            button.age();
        }
    }

    pub fn on_move(&mut self, x: i32, y: i32) {
        self.x = x;
        self.y = y;
    }

    pub fn on_button(&mut self, button: MouseButton, down: bool) {
        match self.buttons.get_mut(button.index()) {
            Some(state) => state.set(down),
            None => tracing::debug!(index = button.0, "ignoring out-of-range mouse button"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges_hold_for_every_button() {
        let mut mouse = Mouse::new();
        for index in 0..BUTTON_COUNT as u8 {
            let button = MouseButton(index);
            mouse.on_button(button, true);
            assert!(mouse.button_pressed(button));
            mouse.update();
            assert!(mouse.button_down(button) && !mouse.button_pressed(button));
            mouse.on_button(button, false);
            assert!(mouse.button_released(button));
            mouse.update();
            assert!(!mouse.button_released(button));
        }
    }

    #[test]
    fn movement_does_not_touch_buttons() {
        let mut mouse = Mouse::new();
        mouse.on_move(-5, 640);
        assert_eq!(mouse.x(), -5);
        assert_eq!(mouse.y(), 640);
        assert!(!mouse.button_down(MouseButton::LEFT));
    }

    #[test]
    fn out_of_range_buttons_read_as_up() {
        let mut mouse = Mouse::new();
        mouse.on_button(MouseButton(9), true);
        assert!(!mouse.button_down(MouseButton(9)));
    }
}
