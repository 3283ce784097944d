//! Render layer: API-agnostic resources, materials and drawables.
//!
//! Everything here talks to a [`RenderBackend`]. The wgpu implementation
//! lives in `orrery-render-wgpu`; [`RecordingBackend`] records commands for
//! tests and headless tooling.
//!
//! # Invariants
//! - Backend objects sit behind generational handles; a stale handle is an
//!   error, never a dangling reference.
//! - A resource wrapper is valid only between a successful `create` and its
//!   `destroy`. A failed `create` leaves it invalid.
//! - A mesh's transform and its material's `u_world` parameter never diverge.
//! - All backend calls come from one thread.

mod backend;
pub mod camera;
mod error;
pub mod loader;
mod material;
pub mod mesh;
pub mod overlay;
pub mod recording;
mod reflect;
mod resource;
pub mod skybox;
mod types;
mod uniform;
mod vertex;

pub use backend::RenderBackend;
pub use camera::Camera;
pub use error::RenderError;
pub use material::{Material, Parameter};
pub use mesh::Mesh;
pub use overlay::DebugOverlay;
pub use recording::{Command, RecordingBackend};
pub use reflect::{ShaderReflection, TextureKind, UniformBlock, UniformField};
pub use resource::{
    Cubemap, Framebuffer, SamplerState, ShaderProgram, Texture, VertexBuffer, VertexLayout,
};
pub use skybox::Skybox;
pub use types::{
    AddressMode, AttributeFormat, BufferId, BufferUsage, CubemapId, CullMode, FilterMode,
    FramebufferFormat, FramebufferId, FrontFace, LayoutId, PrimitiveTopology, ProgramId,
    ResourceKind, SamplerDesc, SamplerId, TextureFormat, TextureId, VertexAttribute,
    vertex_stride,
};
pub use uniform::{UniformType, UniformValue};
pub use vertex::{Vertex2d, Vertex3d};

pub fn crate_info() -> &'static str {
    "orrery-render v0.1.0"
}
