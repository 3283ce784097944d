//! Mappings from render-layer descriptors to wgpu types.

use orrery_render::{
    AddressMode, AttributeFormat, CullMode, FilterMode, FrontFace, PrimitiveTopology,
    RenderError, ResourceKind, SamplerDesc, TextureFormat, VertexAttribute,
};
use std::borrow::Cow;

/// Sampled textures, cubemaps and offscreen colour attachments.
pub(crate) const COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;
pub(crate) const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

pub(crate) fn topology(topology: PrimitiveTopology) -> wgpu::PrimitiveTopology {
    match topology {
        PrimitiveTopology::PointList => wgpu::PrimitiveTopology::PointList,
        PrimitiveTopology::LineList => wgpu::PrimitiveTopology::LineList,
        PrimitiveTopology::LineStrip => wgpu::PrimitiveTopology::LineStrip,
        PrimitiveTopology::TriangleList => wgpu::PrimitiveTopology::TriangleList,
        PrimitiveTopology::TriangleStrip => wgpu::PrimitiveTopology::TriangleStrip,
    }
}

pub(crate) fn cull_mode(cull: CullMode) -> Option<wgpu::Face> {
    match cull {
        CullMode::None => None,
        CullMode::Front => Some(wgpu::Face::Front),
        CullMode::Back => Some(wgpu::Face::Back),
    }
}

pub(crate) fn front_face(front: FrontFace) -> wgpu::FrontFace {
    match front {
        FrontFace::Cw => wgpu::FrontFace::Cw,
        FrontFace::Ccw => wgpu::FrontFace::Ccw,
    }
}

fn filter(filter: FilterMode) -> wgpu::FilterMode {
    match filter {
        FilterMode::Nearest => wgpu::FilterMode::Nearest,
        FilterMode::Linear => wgpu::FilterMode::Linear,
    }
}

fn address(mode: AddressMode) -> wgpu::AddressMode {
    match mode {
        AddressMode::Clamp => wgpu::AddressMode::ClampToEdge,
        AddressMode::Wrap => wgpu::AddressMode::Repeat,
        AddressMode::Mirror => wgpu::AddressMode::MirrorRepeat,
    }
}

pub(crate) fn sampler_descriptor(desc: &SamplerDesc) -> wgpu::SamplerDescriptor<'static> {
    wgpu::SamplerDescriptor {
        label: Some("sampler"),
        address_mode_u: address(desc.address_u),
        address_mode_v: address(desc.address_v),
        address_mode_w: address(desc.address_v),
        mag_filter: filter(desc.filter),
        min_filter: filter(desc.filter),
        mipmap_filter: wgpu::FilterMode::Nearest,
        ..Default::default()
    }
}

fn vertex_format(attribute: &VertexAttribute) -> Option<wgpu::VertexFormat> {
    use wgpu::VertexFormat as F;
    let format = match (attribute.format, attribute.count, attribute.normalized) {
        (AttributeFormat::Float, 1, _) => F::Float32,
        (AttributeFormat::Float, 2, _) => F::Float32x2,
        (AttributeFormat::Float, 3, _) => F::Float32x3,
        (AttributeFormat::Float, 4, _) => F::Float32x4,
        (AttributeFormat::UnsignedByte, 2, true) => F::Unorm8x2,
        (AttributeFormat::UnsignedByte, 4, true) => F::Unorm8x4,
        (AttributeFormat::UnsignedByte, 2, false) => F::Uint8x2,
        (AttributeFormat::UnsignedByte, 4, false) => F::Uint8x4,
        _ => return None,
    };
    Some(format)
}

/// Packed wgpu attributes for a layout, in declaration order.
pub(crate) fn vertex_attributes(
    attributes: &[VertexAttribute],
) -> Result<Vec<wgpu::VertexAttribute>, RenderError> {
    let mut offset = 0;
    attributes
        .iter()
        .map(|attribute| {
            let format = vertex_format(attribute).ok_or_else(|| {
                RenderError::creation(
                    ResourceKind::Layout,
                    format!(
                        "unsupported attribute {:?} x{} at location {}",
                        attribute.format, attribute.count, attribute.location
                    ),
                )
            })?;
            let out = wgpu::VertexAttribute {
                format,
                offset,
                shader_location: attribute.location,
            };
            offset += u64::from(attribute.size());
            Ok(out)
        })
        .collect()
}

/// Pixel data as RGBA8; three-channel images gain an opaque alpha.
pub(crate) fn rgba_pixels(format: TextureFormat, data: &[u8]) -> Cow<'_, [u8]> {
    match format {
        TextureFormat::Rgba8 => Cow::Borrowed(data),
        TextureFormat::Rgb8 => Cow::Owned(
            data.chunks_exact(3)
                .flat_map(|p| [p[0], p[1], p[2], u8::MAX])
                .collect(),
        ),
    }
}
