//! Keyboard and mouse state with per-frame edge detection.
//!
//! # Invariants
//! - `pressed` is true for exactly one frame after an up→down transition,
//!   `released` for exactly one frame after a down→up transition.
//! - State is aged once per frame with `update()`; events only touch the
//!   current half of each `ButtonState`.

mod button;
mod key;
mod keyboard;
mod mouse;

pub use button::ButtonState;
pub use key::{Key, MouseButton};
pub use keyboard::{KEY_COUNT, Keyboard};
pub use mouse::{BUTTON_COUNT, Mouse};

/// Receiver of raw window-system input.
///
/// The platform layer translates its native events into these three calls
/// from inside its event poll, on the frame-loop thread.
pub trait InputSink {
    fn on_key(&mut self, key: Key, pressed: bool);
    fn on_mouse(&mut self, x: i32, y: i32);
    fn on_button(&mut self, button: MouseButton, pressed: bool);
}

pub fn crate_info() -> &'static str {
    "orrery-input v0.1.0"
}
