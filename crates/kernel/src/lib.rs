//! Orrery kernel: orbit math, the celestial body table and per-frame stepping.
//!
//! # Invariants
//! - Bodies are stepped in table order; a parent is always declared (and
//!   therefore moved) before its children.
//! - Orbit angles are always wrapped into `[0, 2π)`.
//! - Nothing here touches the renderer; transforms are plain `glam::Mat4`.

pub mod orbit;
pub mod solar;
pub mod system;

pub use orbit::{orbit, orbit_tethered, wrap_angle};
pub use solar::{Body, SolarSystem};
pub use system::{BodyDesc, OrbitMode, SystemDesc, SystemError};

pub fn crate_info() -> &'static str {
    "orrery-kernel v0.1.0"
}
