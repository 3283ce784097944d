//! The solar system demo: startup sequence, frame loop and render passes,
//! independent of any window system or GPU API.
//!
//! # Invariants
//! - Resources are created in [`Stage::ALL`] order; the first failure stops
//!   startup and no frame is drawn.
//! - Every frame runs poll, tick, draw, then ages the input state, so edge
//!   queries see exactly one transition per frame.
//! - Every frame ends with a present, even when one of its passes failed.

mod application;
mod config;
mod controller;
mod error;
mod platform;

pub use application::{AppState, Application};
pub use config::{
    AppConfig, OFFSCREEN_HEIGHT, OFFSCREEN_WIDTH, WINDOW_HEIGHT, WINDOW_TITLE, WINDOW_WIDTH,
};
pub use controller::Controller;
pub use error::{AppError, Stage, StartupError};
pub use platform::{InputEvent, Platform, ScriptedPlatform};

pub fn crate_info() -> &'static str {
    "orrery-app v0.1.0"
}
