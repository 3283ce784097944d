//! wgpu implementation of [`orrery_render::RenderBackend`].
//!
//! GLSL sources are checked with naga and handed to wgpu as-is. The render
//! layer's immediate-mode calls are recorded per frame and encoded into
//! render passes when the frame is presented.
//!
//! # Invariants
//! - No wgpu call is made with arguments the backend has not validated, so
//!   bad input surfaces as a [`orrery_render::RenderError`] instead of a panic.
//! - Uniform values are captured at draw time; later `set_shader_uniform`
//!   calls never affect an already recorded draw.
//! - Depth writes are disabled whenever the depth test is.

mod backend;
mod convert;
mod frame;
mod pipeline;
mod shader;

pub use backend::WgpuBackend;

/// Returns the crate name and version.
pub fn crate_info() -> &'static str {
    "orrery-render-wgpu v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_info_names_the_backend() {
        assert_eq!(crate_info(), "orrery-render-wgpu v0.1.0");
    }
}
