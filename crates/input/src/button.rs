/// Current and previous-frame state of one key or mouse button.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ButtonState {
    current: bool,
    previous: bool,
}

impl ButtonState {
    pub fn down(&self) -> bool {
        self.current
    }

    pub fn pressed(&self) -> bool {
        self.current && !self.previous
    }

    pub fn released(&self) -> bool {
        !self.current && self.previous
    }

    pub fn set(&mut self, down: bool) {
        self.current = down;
    }

    /// Frame boundary: the current state becomes the previous one.
    pub fn age(&mut self) {
        self.previous = self.current;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges_follow_transitions() {
        let mut b = ButtonState::default();
        assert!(!b.down() && !b.pressed() && !b.released());

        b.set(true);
        assert!(b.down() && b.pressed() && !b.released());

        b.age();
        assert!(b.down() && !b.pressed());

        b.set(false);
        assert!(!b.down() && b.released());

        b.age();
        assert!(!b.released());
    }

    #[test]
    fn press_and_release_within_one_frame_leaves_no_edge() {
        let mut b = ButtonState::default();
        b.set(true);
        b.set(false);
        assert!(!b.pressed() && !b.released());
    }
}
