//! A `RenderBackend` that records commands instead of talking to a GPU.
//!
//! Resources live in generational arenas so stale handles behave exactly as
//! they would on a real backend. Draws validate their bindings the same way
//! the wgpu backend does; shader "compilation" is reflection plus an entry
//! point check.

use crate::RenderBackend;
use crate::RenderError;
use crate::reflect::{ShaderReflection, TextureKind};
use crate::types::{
    BufferId, BufferUsage, CubemapId, CullMode, FramebufferFormat, FramebufferId, FrontFace,
    LayoutId, PrimitiveTopology, ProgramId, ResourceKind, SamplerDesc, SamplerId, TextureFormat,
    TextureId, VertexAttribute, vertex_stride,
};
use crate::uniform::UniformValue;
use slotmap::SlotMap;
use std::collections::{HashMap, HashSet};

/// One recorded backend call.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    CreateBuffer(BufferId),
    UpdateBuffer(BufferId),
    DestroyBuffer(BufferId),
    CreateTexture(TextureId),
    DestroyTexture(TextureId),
    CreateCubemap(CubemapId),
    DestroyCubemap(CubemapId),
    CreateSampler(SamplerId),
    DestroySampler(SamplerId),
    CreateShaderProgram(ProgramId),
    DestroyShaderProgram(ProgramId),
    CreateVertexLayout(LayoutId),
    DestroyVertexLayout(LayoutId),
    CreateFramebuffer(FramebufferId),
    DestroyFramebuffer(FramebufferId),
    SetFramebuffer(FramebufferId),
    ResetFramebuffer,
    Clear([f32; 4]),
    SetViewport {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    },
    SetShaderProgram(ProgramId),
    SetShaderUniform {
        program: ProgramId,
        name: String,
        value: UniformValue,
    },
    SetVertexBuffer(BufferId),
    SetVertexLayout(LayoutId),
    SetTexture(TextureId),
    SetCubemap(CubemapId),
    SetSamplerState(SamplerId),
    SetBlendState(bool),
    SetDepthState {
        test: bool,
        write: bool,
    },
    SetRasterizerState {
        cull: CullMode,
        front: FrontFace,
    },
    Draw {
        topology: PrimitiveTopology,
        first: u32,
        count: u32,
    },
    Present,
}

impl Command {
    pub fn is_draw(&self) -> bool {
        matches!(self, Self::Draw { .. })
    }
}

#[derive(Debug)]
struct TextureRecord {
    format: TextureFormat,
    width: u32,
    height: u32,
}

#[derive(Debug)]
struct ProgramRecord {
    reflection: ShaderReflection,
    uniforms: HashMap<String, UniformValue>,
}

#[derive(Debug)]
struct FramebufferRecord {
    width: u32,
    height: u32,
    colors: Vec<TextureId>,
}

/// Render state as seen by the next draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawState {
    pub framebuffer: Option<FramebufferId>,
    pub viewport: (i32, i32, u32, u32),
    pub program: Option<ProgramId>,
    pub buffer: Option<BufferId>,
    pub layout: Option<LayoutId>,
    pub texture: Option<TextureId>,
    pub cubemap: Option<CubemapId>,
    pub sampler: Option<SamplerId>,
    pub blend: bool,
    pub depth_test: bool,
    pub depth_write: bool,
    pub cull: CullMode,
    pub front: FrontFace,
}

impl DrawState {
    fn new(width: u32, height: u32) -> Self {
        Self {
            framebuffer: None,
            viewport: (0, 0, width, height),
            program: None,
            buffer: None,
            layout: None,
            texture: None,
            cubemap: None,
            sampler: None,
            blend: false,
            depth_test: false,
            depth_write: false,
            cull: CullMode::None,
            front: FrontFace::Ccw,
        }
    }
}

#[derive(Debug)]
pub struct RecordingBackend {
    window: (u32, u32),
    commands: Vec<Command>,
    buffers: SlotMap<BufferId, Vec<u8>>,
    textures: SlotMap<TextureId, TextureRecord>,
    cubemaps: SlotMap<CubemapId, TextureRecord>,
    samplers: SlotMap<SamplerId, SamplerDesc>,
    programs: SlotMap<ProgramId, ProgramRecord>,
    layouts: SlotMap<LayoutId, Vec<VertexAttribute>>,
    framebuffers: SlotMap<FramebufferId, FramebufferRecord>,
    state: DrawState,
    fail_next: HashSet<ResourceKind>,
    draws: usize,
    frames: usize,
}

impl Default for RecordingBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::with_window_size(1280, 720)
    }

    pub fn with_window_size(width: u32, height: u32) -> Self {
        Self {
            window: (width, height),
            commands: Vec::new(),
            buffers: SlotMap::with_key(),
            textures: SlotMap::with_key(),
            cubemaps: SlotMap::with_key(),
            samplers: SlotMap::with_key(),
            programs: SlotMap::with_key(),
            layouts: SlotMap::with_key(),
            framebuffers: SlotMap::with_key(),
            state: DrawState::new(width, height),
            fail_next: HashSet::new(),
            draws: 0,
            frames: 0,
        }
    }

    /// Makes the next creation of `kind` fail.
    pub fn fail_next(&mut self, kind: ResourceKind) {
        self.fail_next.insert(kind);
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }

    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    pub fn buffer_data(&self, id: BufferId) -> Option<&[u8]> {
        self.buffers.get(id).map(Vec::as_slice)
    }

    /// Last value set for `name` on `program`, if the program declares it.
    pub fn uniform(&self, program: ProgramId, name: &str) -> Option<UniformValue> {
        self.programs.get(program)?.uniforms.get(name).copied()
    }

    pub fn state(&self) -> &DrawState {
        &self.state
    }

    pub fn draw_count(&self) -> usize {
        self.draws
    }

    pub fn frame_count(&self) -> usize {
        self.frames
    }

    /// Number of live objects across every arena, framebuffer attachments
    /// included.
    pub fn live_resources(&self) -> usize {
        self.buffers.len()
            + self.textures.len()
            + self.cubemaps.len()
            + self.samplers.len()
            + self.programs.len()
            + self.layouts.len()
            + self.framebuffers.len()
    }

    fn check_failure(&mut self, kind: ResourceKind) -> Result<(), RenderError> {
        if self.fail_next.remove(&kind) {
            tracing::debug!(%kind, "injected creation failure");
            return Err(RenderError::creation(kind, "injected failure"));
        }
        Ok(())
    }

    fn check_pixels(
        kind: ResourceKind,
        format: TextureFormat,
        width: u32,
        height: u32,
        len: usize,
    ) -> Result<(), RenderError> {
        if width == 0 || height == 0 {
            return Err(RenderError::creation(kind, "zero-sized image"));
        }
        let expected = width as usize * height as usize * format.bytes_per_pixel();
        if len != expected {
            return Err(RenderError::creation(
                kind,
                format!("expected {expected} bytes of pixel data, got {len}"),
            ));
        }
        Ok(())
    }

    fn validate_draw(&self, first: u32, count: u32) -> Result<(), RenderError> {
        let program_id = self
            .state
            .program
            .ok_or(RenderError::MissingBinding("shader program"))?;
        let program = self
            .programs
            .get(program_id)
            .ok_or(RenderError::InvalidHandle(ResourceKind::Program))?;

        let buffer_id = self
            .state
            .buffer
            .ok_or(RenderError::MissingBinding("vertex buffer"))?;
        let buffer = self
            .buffers
            .get(buffer_id)
            .ok_or(RenderError::InvalidHandle(ResourceKind::Buffer))?;

        let layout_id = self
            .state
            .layout
            .ok_or(RenderError::MissingBinding("vertex layout"))?;
        let layout = self
            .layouts
            .get(layout_id)
            .ok_or(RenderError::InvalidHandle(ResourceKind::Layout))?;

        match program.reflection.texture {
            Some(TextureKind::D2) => {
                let texture = self
                    .state
                    .texture
                    .ok_or(RenderError::MissingBinding("texture"))?;
                if !self.textures.contains_key(texture) {
                    return Err(RenderError::InvalidHandle(ResourceKind::Texture));
                }
                if self.state.framebuffer.is_some_and(|fb| {
                    self.framebuffers
                        .get(fb)
                        .is_some_and(|rec| rec.colors.contains(&texture))
                }) {
                    return Err(RenderError::MissingBinding(
                        "texture distinct from the current target",
                    ));
                }
            }
            Some(TextureKind::Cube) => {
                let cubemap = self
                    .state
                    .cubemap
                    .ok_or(RenderError::MissingBinding("cubemap"))?;
                if !self.cubemaps.contains_key(cubemap) {
                    return Err(RenderError::InvalidHandle(ResourceKind::Cubemap));
                }
            }
            None => {}
        }
        if program.reflection.texture.is_some() {
            let sampler = self
                .state
                .sampler
                .ok_or(RenderError::MissingBinding("sampler"))?;
            if !self.samplers.contains_key(sampler) {
                return Err(RenderError::InvalidHandle(ResourceKind::Sampler));
            }
        }

        if let Some(fb) = self.state.framebuffer {
            if !self.framebuffers.contains_key(fb) {
                return Err(RenderError::InvalidHandle(ResourceKind::Framebuffer));
            }
        }

        let stride = vertex_stride(layout) as usize;
        let needed = (first as usize + count as usize) * stride;
        if needed > buffer.len() {
            return Err(RenderError::DrawOutOfRange {
                needed,
                available: buffer.len(),
            });
        }
        Ok(())
    }
}

impl RenderBackend for RecordingBackend {
    fn create_buffer(&mut self, usage: BufferUsage, data: &[u8]) -> Result<BufferId, RenderError> {
        self.check_failure(ResourceKind::Buffer)?;
        if data.is_empty() {
            return Err(RenderError::creation(ResourceKind::Buffer, "empty buffer"));
        }
        let id = self.buffers.insert(data.to_vec());
        tracing::trace!(?id, ?usage, size = data.len(), "create buffer");
        self.commands.push(Command::CreateBuffer(id));
        Ok(id)
    }

    fn update_buffer(&mut self, id: BufferId, data: &[u8]) -> Result<(), RenderError> {
        let buffer = self
            .buffers
            .get_mut(id)
            .ok_or(RenderError::InvalidHandle(ResourceKind::Buffer))?;
        let available = buffer.len();
        let dst = buffer
            .get_mut(..data.len())
            .ok_or(RenderError::DrawOutOfRange {
                needed: data.len(),
                available,
            })?;
        dst.copy_from_slice(data);
        self.commands.push(Command::UpdateBuffer(id));
        Ok(())
    }

    fn destroy_buffer(&mut self, id: BufferId) {
        if self.buffers.remove(id).is_some() {
            self.commands.push(Command::DestroyBuffer(id));
        }
    }

    fn create_texture(
        &mut self,
        format: TextureFormat,
        width: u32,
        height: u32,
        data: &[u8],
    ) -> Result<TextureId, RenderError> {
        self.check_failure(ResourceKind::Texture)?;
        Self::check_pixels(ResourceKind::Texture, format, width, height, data.len())?;
        let id = self.textures.insert(TextureRecord {
            format,
            width,
            height,
        });
        self.commands.push(Command::CreateTexture(id));
        Ok(id)
    }

    fn destroy_texture(&mut self, id: TextureId) {
        if self.textures.remove(id).is_some() {
            self.commands.push(Command::DestroyTexture(id));
        }
    }

    fn create_cubemap(
        &mut self,
        format: TextureFormat,
        width: u32,
        height: u32,
        faces: [&[u8]; 6],
    ) -> Result<CubemapId, RenderError> {
        self.check_failure(ResourceKind::Cubemap)?;
        if width != height {
            return Err(RenderError::creation(
                ResourceKind::Cubemap,
                format!("faces must be square, got {width}x{height}"),
            ));
        }
        for face in faces {
            Self::check_pixels(ResourceKind::Cubemap, format, width, height, face.len())?;
        }
        let id = self.cubemaps.insert(TextureRecord {
            format,
            width,
            height,
        });
        self.commands.push(Command::CreateCubemap(id));
        Ok(id)
    }

    fn destroy_cubemap(&mut self, id: CubemapId) {
        if self.cubemaps.remove(id).is_some() {
            self.commands.push(Command::DestroyCubemap(id));
        }
    }

    fn create_sampler(&mut self, desc: &SamplerDesc) -> Result<SamplerId, RenderError> {
        self.check_failure(ResourceKind::Sampler)?;
        let id = self.samplers.insert(*desc);
        self.commands.push(Command::CreateSampler(id));
        Ok(id)
    }

    fn destroy_sampler(&mut self, id: SamplerId) {
        if self.samplers.remove(id).is_some() {
            self.commands.push(Command::DestroySampler(id));
        }
    }

    fn create_shader_program(
        &mut self,
        vertex: &str,
        fragment: &str,
    ) -> Result<ProgramId, RenderError> {
        self.check_failure(ResourceKind::Program)?;
        for (stage, source) in [("vertex", vertex), ("fragment", fragment)] {
            if !source.contains("void main") {
                return Err(RenderError::ShaderCompile(format!(
                    "{stage} shader has no entry point `main`"
                )));
            }
        }
        let reflection = ShaderReflection::program(vertex, fragment)?;
        let id = self.programs.insert(ProgramRecord {
            reflection,
            uniforms: HashMap::new(),
        });
        self.commands.push(Command::CreateShaderProgram(id));
        Ok(id)
    }

    fn destroy_shader_program(&mut self, id: ProgramId) {
        if self.programs.remove(id).is_some() {
            self.commands.push(Command::DestroyShaderProgram(id));
        }
    }

    fn create_vertex_layout(
        &mut self,
        attributes: &[VertexAttribute],
    ) -> Result<LayoutId, RenderError> {
        self.check_failure(ResourceKind::Layout)?;
        let id = self.layouts.insert(attributes.to_vec());
        self.commands.push(Command::CreateVertexLayout(id));
        Ok(id)
    }

    fn destroy_vertex_layout(&mut self, id: LayoutId) {
        if self.layouts.remove(id).is_some() {
            self.commands.push(Command::DestroyVertexLayout(id));
        }
    }

    fn create_framebuffer(
        &mut self,
        width: u32,
        height: u32,
        formats: &[FramebufferFormat],
    ) -> Result<FramebufferId, RenderError> {
        self.check_failure(ResourceKind::Framebuffer)?;
        if width == 0 || height == 0 || formats.is_empty() {
            return Err(RenderError::creation(
                ResourceKind::Framebuffer,
                "framebuffer needs a size and at least one attachment",
            ));
        }
        if formats.iter().filter(|f| f.is_depth()).count() > 1 {
            return Err(RenderError::creation(
                ResourceKind::Framebuffer,
                "more than one depth attachment",
            ));
        }
        let colors = formats
            .iter()
            .filter(|f| !f.is_depth())
            .map(|_| {
                self.textures.insert(TextureRecord {
                    format: TextureFormat::Rgba8,
                    width,
                    height,
                })
            })
            .collect();
        let id = self.framebuffers.insert(FramebufferRecord {
            width,
            height,
            colors,
        });
        self.commands.push(Command::CreateFramebuffer(id));
        Ok(id)
    }

    fn framebuffer_color_attachment(&self, id: FramebufferId, index: usize) -> Option<TextureId> {
        self.framebuffers.get(id)?.colors.get(index).copied()
    }

    fn destroy_framebuffer(&mut self, id: FramebufferId) {
        if let Some(record) = self.framebuffers.remove(id) {
            for texture in record.colors {
                self.textures.remove(texture);
            }
            self.commands.push(Command::DestroyFramebuffer(id));
        }
    }

    fn set_framebuffer(&mut self, id: FramebufferId) {
        self.state.framebuffer = Some(id);
        if let Some(record) = self.framebuffers.get(id) {
            self.state.viewport = (0, 0, record.width, record.height);
        }
        self.commands.push(Command::SetFramebuffer(id));
    }

    fn reset_framebuffer(&mut self) {
        self.state.framebuffer = None;
        self.state.viewport = (0, 0, self.window.0, self.window.1);
        self.commands.push(Command::ResetFramebuffer);
    }

    fn clear(&mut self, r: f32, g: f32, b: f32, a: f32) {
        self.commands.push(Command::Clear([r, g, b, a]));
    }

    fn set_viewport(&mut self, x: i32, y: i32, width: u32, height: u32) {
        self.state.viewport = (x, y, width, height);
        self.commands.push(Command::SetViewport {
            x,
            y,
            width,
            height,
        });
    }

    fn set_shader_program(&mut self, id: ProgramId) {
        self.state.program = Some(id);
        self.commands.push(Command::SetShaderProgram(id));
    }

    fn set_shader_uniform(&mut self, program: ProgramId, name: &str, value: &UniformValue) {
        if let Some(record) = self.programs.get_mut(program) {
            let declared = record
                .reflection
                .block
                .as_ref()
                .and_then(|block| block.field(name))
                .is_some_and(|field| field.ty == value.ty());
            if declared {
                record.uniforms.insert(name.to_string(), *value);
            }
        }
        self.commands.push(Command::SetShaderUniform {
            program,
            name: name.to_string(),
            value: *value,
        });
    }

    fn set_vertex_buffer(&mut self, id: BufferId) {
        self.state.buffer = Some(id);
        self.commands.push(Command::SetVertexBuffer(id));
    }

    fn set_vertex_layout(&mut self, id: LayoutId) {
        self.state.layout = Some(id);
        self.commands.push(Command::SetVertexLayout(id));
    }

    fn set_texture(&mut self, id: TextureId) {
        self.state.texture = Some(id);
        self.commands.push(Command::SetTexture(id));
    }

    fn set_cubemap(&mut self, id: CubemapId) {
        self.state.cubemap = Some(id);
        self.commands.push(Command::SetCubemap(id));
    }

    fn set_sampler_state(&mut self, id: SamplerId) {
        self.state.sampler = Some(id);
        self.commands.push(Command::SetSamplerState(id));
    }

    fn set_blend_state(&mut self, enabled: bool) {
        self.state.blend = enabled;
        self.commands.push(Command::SetBlendState(enabled));
    }

    fn set_depth_state(&mut self, test: bool, write: bool) {
        self.state.depth_test = test;
        self.state.depth_write = test && write;
        self.commands.push(Command::SetDepthState { test, write });
    }

    fn set_rasterizer_state(&mut self, cull: CullMode, front: FrontFace) {
        self.state.cull = cull;
        self.state.front = front;
        self.commands.push(Command::SetRasterizerState { cull, front });
    }

    fn draw(
        &mut self,
        topology: PrimitiveTopology,
        first: u32,
        count: u32,
    ) -> Result<(), RenderError> {
        self.validate_draw(first, count)?;
        self.draws += 1;
        self.commands.push(Command::Draw {
            topology,
            first,
            count,
        });
        Ok(())
    }

    fn present(&mut self) -> Result<(), RenderError> {
        self.frames += 1;
        self.commands.push(Command::Present);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AttributeFormat;

    const VS: &str = "uniform U { mat4 u_world; }; void main() {}";
    const FS: &str = "uniform texture2D t; uniform sampler s; void main() {}";

    fn layout(backend: &mut RecordingBackend) -> LayoutId {
        backend
            .create_vertex_layout(&[VertexAttribute {
                location: 0,
                format: AttributeFormat::Float,
                count: 2,
                normalized: false,
            }])
            .unwrap()
    }

    #[test]
    fn draw_requires_bindings() {
        let mut b = RecordingBackend::new();
        assert!(matches!(
            b.draw(PrimitiveTopology::TriangleList, 0, 3),
            Err(RenderError::MissingBinding("shader program"))
        ));

        let program = b.create_shader_program(VS, FS).unwrap();
        b.set_shader_program(program);
        assert!(matches!(
            b.draw(PrimitiveTopology::TriangleList, 0, 3),
            Err(RenderError::MissingBinding("vertex buffer"))
        ));

        let buffer = b.create_buffer(BufferUsage::Static, &[0; 24]).unwrap();
        let layout = layout(&mut b);
        b.set_vertex_buffer(buffer);
        b.set_vertex_layout(layout);
        assert!(matches!(
            b.draw(PrimitiveTopology::TriangleList, 0, 3),
            Err(RenderError::MissingBinding("texture"))
        ));

        let texture = b.create_texture(TextureFormat::Rgb8, 1, 1, &[0; 3]).unwrap();
        b.set_texture(texture);
        assert!(matches!(
            b.draw(PrimitiveTopology::TriangleList, 0, 3),
            Err(RenderError::MissingBinding("sampler"))
        ));

        let sampler = b
            .create_sampler(&SamplerDesc::new(
                crate::FilterMode::Nearest,
                crate::AddressMode::Clamp,
                crate::AddressMode::Clamp,
            ))
            .unwrap();
        b.set_sampler_state(sampler);
        b.draw(PrimitiveTopology::TriangleList, 0, 3).unwrap();
        assert_eq!(b.draw_count(), 1);

        assert!(matches!(
            b.draw(PrimitiveTopology::TriangleList, 1, 3),
            Err(RenderError::DrawOutOfRange { needed: 32, available: 24 })
        ));
    }

    #[test]
    fn update_writes_in_place_and_rejects_overflow() {
        let mut b = RecordingBackend::new();
        let buffer = b.create_buffer(BufferUsage::Dynamic, &[0; 8]).unwrap();

        b.update_buffer(buffer, &[7; 4]).unwrap();
        assert_eq!(b.buffer_data(buffer), Some(&[7, 7, 7, 7, 0, 0, 0, 0][..]));
        assert_eq!(b.commands().last(), Some(&Command::UpdateBuffer(buffer)));

        assert!(matches!(
            b.update_buffer(buffer, &[1; 12]),
            Err(RenderError::DrawOutOfRange { needed: 12, available: 8 })
        ));
        assert_eq!(b.buffer_data(buffer), Some(&[7, 7, 7, 7, 0, 0, 0, 0][..]));
    }

    #[test]
    fn stale_handles_are_detected() {
        let mut b = RecordingBackend::new();
        let program = b.create_shader_program("void main() {}", "void main() {}").unwrap();
        let buffer = b.create_buffer(BufferUsage::Static, &[0; 8]).unwrap();
        let layout = layout(&mut b);
        b.set_shader_program(program);
        b.set_vertex_buffer(buffer);
        b.set_vertex_layout(layout);
        b.draw(PrimitiveTopology::TriangleList, 0, 1).unwrap();

        b.destroy_buffer(buffer);
        let reused = b.create_buffer(BufferUsage::Static, &[0; 8]).unwrap();
        assert_ne!(reused, buffer);
        assert!(matches!(
            b.draw(PrimitiveTopology::TriangleList, 0, 1),
            Err(RenderError::InvalidHandle(ResourceKind::Buffer))
        ));
    }

    #[test]
    fn shader_without_main_fails_to_compile() {
        let mut b = RecordingBackend::new();
        assert!(matches!(
            b.create_shader_program("void main() {}", "// empty"),
            Err(RenderError::ShaderCompile(_))
        ));
        assert_eq!(b.live_resources(), 0);
    }

    #[test]
    fn uniforms_only_stick_when_declared() {
        let mut b = RecordingBackend::new();
        let program = b.create_shader_program(VS, FS).unwrap();
        let m = glam::Mat4::from_scale(glam::Vec3::splat(2.0));
        b.set_shader_uniform(program, "u_world", &UniformValue::Mat4(m));
        b.set_shader_uniform(program, "u_other", &UniformValue::Float(1.0));
        b.set_shader_uniform(program, "u_world", &UniformValue::Float(1.0));

        assert_eq!(b.uniform(program, "u_world"), Some(UniformValue::Mat4(m)));
        assert_eq!(b.uniform(program, "u_other"), None);
        assert_eq!(b.commands().len(), 4);
    }

    #[test]
    fn framebuffer_sets_viewport_and_owns_attachments() {
        let mut b = RecordingBackend::with_window_size(800, 600);
        let fb = b
            .create_framebuffer(320, 180, &[FramebufferFormat::Rgba8, FramebufferFormat::D32])
            .unwrap();
        assert_eq!(b.live_resources(), 2);

        b.set_framebuffer(fb);
        assert_eq!(b.state().viewport, (0, 0, 320, 180));
        b.reset_framebuffer();
        assert_eq!(b.state().viewport, (0, 0, 800, 600));

        b.destroy_framebuffer(fb);
        assert_eq!(b.live_resources(), 0);
        assert!(b.framebuffer_color_attachment(fb, 0).is_none());
    }

    #[test]
    fn depth_write_needs_depth_test() {
        let mut b = RecordingBackend::new();
        b.set_depth_state(false, true);
        assert!(!b.state().depth_write);
        b.set_depth_state(true, true);
        assert!(b.state().depth_write);
    }

    #[test]
    fn injected_failure_is_one_shot() {
        let mut b = RecordingBackend::new();
        b.fail_next(ResourceKind::Sampler);
        let desc = SamplerDesc::new(
            crate::FilterMode::Linear,
            crate::AddressMode::Wrap,
            crate::AddressMode::Wrap,
        );
        assert!(b.create_sampler(&desc).is_err());
        assert!(b.create_sampler(&desc).is_ok());
    }

    #[test]
    fn pixel_data_size_is_checked() {
        let mut b = RecordingBackend::new();
        assert!(b.create_texture(TextureFormat::Rgba8, 2, 2, &[0; 15]).is_err());
        assert!(
            b.create_cubemap(TextureFormat::Rgb8, 2, 1, [&[0u8; 6][..]; 6])
                .is_err()
        );
        assert!(
            b.create_cubemap(TextureFormat::Rgb8, 1, 1, [&[0u8; 3][..]; 6])
                .is_ok()
        );
    }

    #[test]
    fn present_counts_frames() {
        let mut b = RecordingBackend::new();
        b.present().unwrap();
        b.present().unwrap();
        assert_eq!(b.frame_count(), 2);
        assert_eq!(b.take_commands(), vec![Command::Present, Command::Present]);
        assert!(b.commands().is_empty());
    }
}
