//! Handles and plain descriptors shared by every backend.

slotmap::new_key_type! {
    pub struct BufferId;
    pub struct TextureId;
    pub struct CubemapId;
    pub struct SamplerId;
    pub struct ProgramId;
    pub struct LayoutId;
    pub struct FramebufferId;
}

/// Resource categories, used in errors and for failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Buffer,
    Texture,
    Cubemap,
    Sampler,
    Program,
    Layout,
    Framebuffer,
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Buffer => "buffer",
            Self::Texture => "texture",
            Self::Cubemap => "cubemap",
            Self::Sampler => "sampler",
            Self::Program => "shader program",
            Self::Layout => "vertex layout",
            Self::Framebuffer => "framebuffer",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveTopology {
    PointList,
    LineList,
    LineStrip,
    TriangleList,
    TriangleStrip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CullMode {
    None,
    Front,
    Back,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrontFace {
    Cw,
    Ccw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterMode {
    Nearest,
    Linear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressMode {
    Clamp,
    Wrap,
    Mirror,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    Rgb8,
    Rgba8,
}

impl TextureFormat {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Rgb8 => 3,
            Self::Rgba8 => 4,
        }
    }
}

impl From<orrery_assets::PixelFormat> for TextureFormat {
    fn from(format: orrery_assets::PixelFormat) -> Self {
        match format {
            orrery_assets::PixelFormat::Rgb8 => Self::Rgb8,
            orrery_assets::PixelFormat::Rgba8 => Self::Rgba8,
        }
    }
}

/// Attachment formats of an offscreen framebuffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FramebufferFormat {
    Rgba8,
    D32,
}

impl FramebufferFormat {
    pub fn is_depth(self) -> bool {
        matches!(self, Self::D32)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferUsage {
    Static,
    Dynamic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeFormat {
    Float,
    UnsignedByte,
}

impl AttributeFormat {
    pub fn size(self) -> u32 {
        match self {
            Self::Float => 4,
            Self::UnsignedByte => 1,
        }
    }
}

/// One vertex shader input. Attributes are tightly packed in declaration
/// order; the stride is the sum of their sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexAttribute {
    pub location: u32,
    pub format: AttributeFormat,
    pub count: u32,
    pub normalized: bool,
}

impl VertexAttribute {
    pub fn size(&self) -> u32 {
        self.format.size() * self.count
    }
}

/// Byte stride of a packed attribute list.
pub fn vertex_stride(attributes: &[VertexAttribute]) -> u32 {
    attributes.iter().map(VertexAttribute::size).sum()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SamplerDesc {
    pub filter: FilterMode,
    pub address_u: AddressMode,
    pub address_v: AddressMode,
}

impl SamplerDesc {
    pub const fn new(filter: FilterMode, address_u: AddressMode, address_v: AddressMode) -> Self {
        Self {
            filter,
            address_u,
            address_v,
        }
    }
}
