use crate::RenderError;
use crate::types::{
    BufferId, BufferUsage, CubemapId, CullMode, FramebufferFormat, FramebufferId, FrontFace,
    LayoutId, PrimitiveTopology, ProgramId, SamplerDesc, SamplerId, TextureFormat, TextureId,
    VertexAttribute,
};
use crate::uniform::UniformValue;

/// A graphics API beneath the render layer.
///
/// Resource calls create, update and destroy GPU objects behind generational
/// handles. Command calls mirror a GL-style state machine: bindings and fixed
/// function state persist until changed and are consumed by `draw`. Binding
/// calls never fail; a stale handle is reported by the `draw` that uses it.
///
/// All calls come from the single frame-loop thread.
pub trait RenderBackend {
    fn create_buffer(&mut self, usage: BufferUsage, data: &[u8]) -> Result<BufferId, RenderError>;
    /// Overwrites the start of the buffer. `data` must fit its current size.
    fn update_buffer(&mut self, id: BufferId, data: &[u8]) -> Result<(), RenderError>;
    fn destroy_buffer(&mut self, id: BufferId);

    /// `data` holds tightly packed rows, top row first.
    fn create_texture(
        &mut self,
        format: TextureFormat,
        width: u32,
        height: u32,
        data: &[u8],
    ) -> Result<TextureId, RenderError>;
    fn destroy_texture(&mut self, id: TextureId);

    /// Faces in +X, -X, +Y, -Y, +Z, -Z order.
    fn create_cubemap(
        &mut self,
        format: TextureFormat,
        width: u32,
        height: u32,
        faces: [&[u8]; 6],
    ) -> Result<CubemapId, RenderError>;
    fn destroy_cubemap(&mut self, id: CubemapId);

    fn create_sampler(&mut self, desc: &SamplerDesc) -> Result<SamplerId, RenderError>;
    fn destroy_sampler(&mut self, id: SamplerId);

    /// Compiles and links a GLSL vertex/fragment pair.
    fn create_shader_program(
        &mut self,
        vertex: &str,
        fragment: &str,
    ) -> Result<ProgramId, RenderError>;
    fn destroy_shader_program(&mut self, id: ProgramId);

    fn create_vertex_layout(
        &mut self,
        attributes: &[VertexAttribute],
    ) -> Result<LayoutId, RenderError>;
    fn destroy_vertex_layout(&mut self, id: LayoutId);

    /// Creates an offscreen target with one attachment per format. Colour
    /// attachments are textures owned by the framebuffer.
    fn create_framebuffer(
        &mut self,
        width: u32,
        height: u32,
        formats: &[FramebufferFormat],
    ) -> Result<FramebufferId, RenderError>;
    /// The `index`-th colour attachment, counting colour formats only.
    fn framebuffer_color_attachment(&self, id: FramebufferId, index: usize) -> Option<TextureId>;
    fn destroy_framebuffer(&mut self, id: FramebufferId);

    /// Redirects output to `id` and resets the viewport to its size.
    fn set_framebuffer(&mut self, id: FramebufferId);
    /// Redirects output to the window.
    fn reset_framebuffer(&mut self);
    /// Clears colour and depth of the current target.
    fn clear(&mut self, r: f32, g: f32, b: f32, a: f32);
    fn set_viewport(&mut self, x: i32, y: i32, width: u32, height: u32);
    fn set_shader_program(&mut self, id: ProgramId);
    /// Sets a member of `program`'s uniform block. Unknown names are ignored.
    fn set_shader_uniform(&mut self, program: ProgramId, name: &str, value: &UniformValue);
    fn set_vertex_buffer(&mut self, id: BufferId);
    fn set_vertex_layout(&mut self, id: LayoutId);
    fn set_texture(&mut self, id: TextureId);
    fn set_cubemap(&mut self, id: CubemapId);
    fn set_sampler_state(&mut self, id: SamplerId);
    fn set_blend_state(&mut self, enabled: bool);
    /// Depth writes only happen while the depth test is enabled.
    fn set_depth_state(&mut self, test: bool, write: bool);
    fn set_rasterizer_state(&mut self, cull: CullMode, front: FrontFace);
    fn draw(&mut self, topology: PrimitiveTopology, first: u32, count: u32)
    -> Result<(), RenderError>;

    /// Finishes the frame and shows it.
    fn present(&mut self) -> Result<(), RenderError>;
}
