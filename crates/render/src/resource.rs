//! Owning wrappers around backend handles.
//!
//! Each wrapper starts invalid, becomes valid on a successful `create`, and
//! returns to invalid on `destroy`. A failed `create` leaves it untouched.

use crate::RenderBackend;
use crate::RenderError;
use crate::types::{
    AttributeFormat, BufferId, BufferUsage, CubemapId, FramebufferFormat, FramebufferId,
    LayoutId, ProgramId, ResourceKind, SamplerDesc, SamplerId, TextureFormat, TextureId,
    VertexAttribute, vertex_stride,
};

macro_rules! handle_accessors {
    ($ty:ident, $id:ty, $kind:expr, $destroy:ident) => {
        impl $ty {
            pub fn is_valid(&self) -> bool {
                self.id.is_some()
            }

            pub fn id(&self) -> Result<$id, RenderError> {
                self.id.ok_or(RenderError::NotCreated($kind))
            }

            fn ensure_unused(&self) -> Result<(), RenderError> {
                match self.id {
                    Some(_) => Err(RenderError::AlreadyCreated($kind)),
                    None => Ok(()),
                }
            }

            /// Releases the backend object. Invalid wrappers are left alone.
            pub fn destroy(&mut self, backend: &mut dyn RenderBackend) {
                if let Some(id) = self.id.take() {
                    backend.$destroy(id);
                }
            }
        }
    };
}

/// A vertex buffer with a grow-if-needed update policy.
#[derive(Debug, Default)]
pub struct VertexBuffer {
    id: Option<BufferId>,
    usage: Option<BufferUsage>,
    size: usize,
}

handle_accessors!(VertexBuffer, BufferId, ResourceKind::Buffer, destroy_buffer);

impl VertexBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(
        &mut self,
        backend: &mut dyn RenderBackend,
        usage: BufferUsage,
        data: &[u8],
    ) -> Result<(), RenderError> {
        self.ensure_unused()?;
        self.id = Some(backend.create_buffer(usage, data)?);
        self.usage = Some(usage);
        self.size = data.len();
        Ok(())
    }

    /// Replaces the contents. Data that no longer fits recreates the buffer
    /// at the new size; otherwise the existing buffer is written in place.
    pub fn update(
        &mut self,
        backend: &mut dyn RenderBackend,
        data: &[u8],
    ) -> Result<(), RenderError> {
        let id = self.id()?;
        if data.len() > self.size {
            let usage = self.usage.unwrap_or(BufferUsage::Dynamic);
            let replacement = backend.create_buffer(usage, data)?;
            backend.destroy_buffer(id);
            self.id = Some(replacement);
            self.size = data.len();
            Ok(())
        } else {
            backend.update_buffer(id, data)
        }
    }

    /// Current capacity in bytes.
    pub fn size(&self) -> usize {
        self.size
    }
}

#[derive(Debug, Default)]
pub struct Texture {
    id: Option<TextureId>,
    width: u32,
    height: u32,
}

handle_accessors!(Texture, TextureId, ResourceKind::Texture, destroy_texture);

impl Texture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(
        &mut self,
        backend: &mut dyn RenderBackend,
        format: TextureFormat,
        width: u32,
        height: u32,
        data: &[u8],
    ) -> Result<(), RenderError> {
        self.ensure_unused()?;
        self.id = Some(backend.create_texture(format, width, height, data)?);
        self.width = width;
        self.height = height;
        Ok(())
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

#[derive(Debug, Default)]
pub struct Cubemap {
    id: Option<CubemapId>,
}

handle_accessors!(Cubemap, CubemapId, ResourceKind::Cubemap, destroy_cubemap);

impl Cubemap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(
        &mut self,
        backend: &mut dyn RenderBackend,
        format: TextureFormat,
        width: u32,
        height: u32,
        faces: [&[u8]; 6],
    ) -> Result<(), RenderError> {
        self.ensure_unused()?;
        self.id = Some(backend.create_cubemap(format, width, height, faces)?);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct SamplerState {
    id: Option<SamplerId>,
}

handle_accessors!(SamplerState, SamplerId, ResourceKind::Sampler, destroy_sampler);

impl SamplerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(
        &mut self,
        backend: &mut dyn RenderBackend,
        desc: SamplerDesc,
    ) -> Result<(), RenderError> {
        self.ensure_unused()?;
        self.id = Some(backend.create_sampler(&desc)?);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct ShaderProgram {
    id: Option<ProgramId>,
}

handle_accessors!(ShaderProgram, ProgramId, ResourceKind::Program, destroy_shader_program);

impl ShaderProgram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(
        &mut self,
        backend: &mut dyn RenderBackend,
        vertex: &str,
        fragment: &str,
    ) -> Result<(), RenderError> {
        self.ensure_unused()?;
        self.id = Some(backend.create_shader_program(vertex, fragment)?);
        Ok(())
    }
}

/// Attribute list plus the backend layout object built from it.
#[derive(Debug, Default)]
pub struct VertexLayout {
    id: Option<LayoutId>,
    attributes: Vec<VertexAttribute>,
}

handle_accessors!(VertexLayout, LayoutId, ResourceKind::Layout, destroy_vertex_layout);

impl VertexLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_attribute(
        &mut self,
        location: u32,
        format: AttributeFormat,
        count: u32,
        normalized: bool,
    ) -> &mut Self {
        self.attributes.push(VertexAttribute {
            location,
            format,
            count,
            normalized,
        });
        self
    }

    pub fn attributes(&self) -> &[VertexAttribute] {
        &self.attributes
    }

    pub fn stride(&self) -> u32 {
        vertex_stride(&self.attributes)
    }

    pub fn create(&mut self, backend: &mut dyn RenderBackend) -> Result<(), RenderError> {
        self.ensure_unused()?;
        if self.attributes.is_empty() {
            return Err(RenderError::creation(ResourceKind::Layout, "no attributes"));
        }
        self.id = Some(backend.create_vertex_layout(&self.attributes)?);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct Framebuffer {
    id: Option<FramebufferId>,
    width: u32,
    height: u32,
}

handle_accessors!(Framebuffer, FramebufferId, ResourceKind::Framebuffer, destroy_framebuffer);

impl Framebuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(
        &mut self,
        backend: &mut dyn RenderBackend,
        width: u32,
        height: u32,
        formats: &[FramebufferFormat],
    ) -> Result<(), RenderError> {
        self.ensure_unused()?;
        self.id = Some(backend.create_framebuffer(width, height, formats)?);
        self.width = width;
        self.height = height;
        Ok(())
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// The `index`-th colour attachment as a sampleable texture.
    pub fn color_attachment(
        &self,
        backend: &dyn RenderBackend,
        index: usize,
    ) -> Result<TextureId, RenderError> {
        backend
            .framebuffer_color_attachment(self.id()?, index)
            .ok_or(RenderError::InvalidHandle(ResourceKind::Texture))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::{Command, RecordingBackend};
    use crate::types::{AddressMode, FilterMode};

    #[test]
    fn buffer_lifecycle() {
        let mut backend = RecordingBackend::new();
        let mut buffer = VertexBuffer::new();
        assert!(!buffer.is_valid());
        assert!(matches!(buffer.id(), Err(RenderError::NotCreated(_))));

        buffer.create(&mut backend, BufferUsage::Static, &[1, 2, 3, 4]).unwrap();
        assert!(buffer.is_valid());
        assert!(matches!(
            buffer.create(&mut backend, BufferUsage::Static, &[0]),
            Err(RenderError::AlreadyCreated(ResourceKind::Buffer))
        ));

        let id = buffer.id().unwrap();
        buffer.destroy(&mut backend);
        assert!(!buffer.is_valid());
        assert!(backend.buffer_data(id).is_none());

        // destroying twice is a no-op
        buffer.destroy(&mut backend);
    }

    #[test]
    fn failed_create_leaves_wrapper_invalid() {
        let mut backend = RecordingBackend::new();
        backend.fail_next(ResourceKind::Buffer);
        let mut buffer = VertexBuffer::new();
        assert!(buffer.create(&mut backend, BufferUsage::Static, &[1]).is_err());
        assert!(!buffer.is_valid());
        assert_eq!(buffer.size(), 0);

        buffer.create(&mut backend, BufferUsage::Static, &[1]).unwrap();
        assert!(buffer.is_valid());
    }

    #[test]
    fn update_in_place_when_it_fits() {
        let mut backend = RecordingBackend::new();
        let mut buffer = VertexBuffer::new();
        buffer.create(&mut backend, BufferUsage::Dynamic, &[0; 8]).unwrap();
        let id = buffer.id().unwrap();

        buffer.update(&mut backend, &[7; 4]).unwrap();
        assert_eq!(buffer.id().unwrap(), id);
        assert_eq!(backend.buffer_data(id).unwrap(), &[7, 7, 7, 7, 0, 0, 0, 0]);
    }

    #[test]
    fn update_grows_when_too_small() {
        let mut backend = RecordingBackend::new();
        let mut buffer = VertexBuffer::new();
        buffer.create(&mut backend, BufferUsage::Dynamic, &[0; 4]).unwrap();
        let old = buffer.id().unwrap();

        buffer.update(&mut backend, &[9; 12]).unwrap();
        let new = buffer.id().unwrap();
        assert_ne!(old, new);
        assert_eq!(buffer.size(), 12);
        assert!(backend.buffer_data(old).is_none());
        assert_eq!(backend.buffer_data(new).unwrap().len(), 12);
        assert!(
            backend
                .commands()
                .iter()
                .any(|c| matches!(c, Command::DestroyBuffer(id) if *id == old))
        );
    }

    #[test]
    fn update_requires_creation() {
        let mut backend = RecordingBackend::new();
        let mut buffer = VertexBuffer::new();
        assert!(buffer.update(&mut backend, &[1]).is_err());
    }

    #[test]
    fn layout_needs_attributes() {
        let mut backend = RecordingBackend::new();
        let mut layout = VertexLayout::new();
        assert!(layout.create(&mut backend).is_err());

        layout
            .add_attribute(0, AttributeFormat::Float, 3, false)
            .add_attribute(1, AttributeFormat::Float, 2, false);
        assert_eq!(layout.stride(), 20);
        layout.create(&mut backend).unwrap();
        assert!(layout.is_valid());
    }

    #[test]
    fn framebuffer_exposes_color_attachment() {
        let mut backend = RecordingBackend::new();
        let mut fb = Framebuffer::new();
        fb.create(
            &mut backend,
            320,
            180,
            &[FramebufferFormat::Rgba8, FramebufferFormat::D32],
        )
        .unwrap();
        assert_eq!(fb.size(), (320, 180));
        assert!(fb.color_attachment(&backend, 0).is_ok());
        assert!(fb.color_attachment(&backend, 1).is_err());
    }

    #[test]
    fn sampler_and_texture_create() {
        let mut backend = RecordingBackend::new();
        let mut sampler = SamplerState::new();
        sampler
            .create(
                &mut backend,
                SamplerDesc::new(FilterMode::Linear, AddressMode::Clamp, AddressMode::Clamp),
            )
            .unwrap();
        assert!(sampler.is_valid());

        let mut texture = Texture::new();
        texture
            .create(&mut backend, TextureFormat::Rgb8, 2, 1, &[0; 6])
            .unwrap();
        assert_eq!(texture.size(), (2, 1));
    }
}
