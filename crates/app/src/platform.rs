use orrery_input::{InputSink, Key, MouseButton};
use std::collections::VecDeque;

/// The window system as seen by the frame loop.
pub trait Platform {
    /// Whether the window and graphics context came up.
    fn is_valid(&self) -> bool;

    /// Delivers pending input to `sink`. Returns `false` once the window
    /// has been asked to close.
    fn poll_events(&mut self, sink: &mut dyn InputSink) -> bool;
}

/// One raw input event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Key(Key, bool),
    MouseMove(i32, i32),
    Button(MouseButton, bool),
}

impl InputEvent {
    pub fn deliver(self, sink: &mut dyn InputSink) {
        match self {
            InputEvent::Key(key, pressed) => sink.on_key(key, pressed),
            InputEvent::MouseMove(x, y) => sink.on_mouse(x, y),
            InputEvent::Button(button, pressed) => sink.on_button(button, pressed),
        }
    }
}

/// A windowless platform that replays scripted input for a fixed number of
/// frames, then reports a close request.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPlatform {
    frames: VecDeque<Vec<InputEvent>>,
    polled: usize,
}

impl ScriptedPlatform {
    /// Runs `frames` frames without input.
    pub fn idle(frames: usize) -> Self {
        Self {
            frames: std::iter::repeat_with(Vec::new).take(frames).collect(),
            polled: 0,
        }
    }

    /// Appends a frame whose poll delivers `events`.
    pub fn push_frame(&mut self, events: Vec<InputEvent>) -> &mut Self {
        self.frames.push_back(events);
        self
    }

    /// Number of polls that let a frame run.
    pub fn frames_polled(&self) -> usize {
        self.polled
    }
}

impl Platform for ScriptedPlatform {
    fn is_valid(&self) -> bool {
        true
    }

    fn poll_events(&mut self, sink: &mut dyn InputSink) -> bool {
        let Some(events) = self.frames.pop_front() else {
            return false;
        };
        for event in events {
            event.deliver(sink);
        }
        self.polled += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Log(Vec<InputEvent>);

    impl InputSink for Log {
        fn on_key(&mut self, key: Key, pressed: bool) {
            self.0.push(InputEvent::Key(key, pressed));
        }
        fn on_mouse(&mut self, x: i32, y: i32) {
            self.0.push(InputEvent::MouseMove(x, y));
        }
        fn on_button(&mut self, button: MouseButton, pressed: bool) {
            self.0.push(InputEvent::Button(button, pressed));
        }
    }

    #[test]
    fn scripted_frames_then_close() {
        let mut platform = ScriptedPlatform::default();
        platform
            .push_frame(vec![InputEvent::Key(Key::W, true)])
            .push_frame(vec![
                InputEvent::MouseMove(3, 4),
                InputEvent::Button(MouseButton::LEFT, true),
            ]);

        let mut log = Log::default();
        assert!(platform.poll_events(&mut log));
        assert!(platform.poll_events(&mut log));
        assert!(!platform.poll_events(&mut log));
        assert_eq!(platform.frames_polled(), 2);
        assert_eq!(
            log.0,
            vec![
                InputEvent::Key(Key::W, true),
                InputEvent::MouseMove(3, 4),
                InputEvent::Button(MouseButton::LEFT, true),
            ]
        );
    }

    #[test]
    fn idle_platform_runs_exact_frame_count() {
        let mut platform = ScriptedPlatform::idle(3);
        let mut log = Log::default();
        let mut frames = 0;
        while platform.poll_events(&mut log) {
            frames += 1;
        }
        assert_eq!(frames, 3);
        assert!(log.0.is_empty());
    }
}
