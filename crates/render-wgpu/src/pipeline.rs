use crate::convert::{self, DEPTH_FORMAT};
use crate::shader::{ENTRY_POINT, ValidationScope};
use orrery_render::{
    CullMode, FrontFace, LayoutId, PrimitiveTopology, ProgramId, RenderError, ResourceKind,
    TextureKind, VertexAttribute, vertex_stride,
};

/// Attachment formats of a render target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct TargetFormat {
    pub color: wgpu::TextureFormat,
    pub color_count: u8,
    pub depth: bool,
}

/// Everything a wgpu render pipeline bakes in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct PipelineKey {
    pub program: ProgramId,
    pub layout: LayoutId,
    pub topology: PrimitiveTopology,
    pub blend: bool,
    pub depth_test: bool,
    pub depth_write: bool,
    pub cull: CullMode,
    pub front: FrontFace,
    pub target: TargetFormat,
}

impl PipelineKey {
    fn depth_stencil(&self) -> Option<wgpu::DepthStencilState> {
        self.target.depth.then(|| wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: self.depth_test && self.depth_write,
            depth_compare: if self.depth_test {
                wgpu::CompareFunction::Less
            } else {
                wgpu::CompareFunction::Always
            },
            stencil: Default::default(),
            bias: Default::default(),
        })
    }

    fn blend_state(&self) -> wgpu::BlendState {
        if self.blend {
            wgpu::BlendState::ALPHA_BLENDING
        } else {
            wgpu::BlendState::REPLACE
        }
    }
}

/// Bind group layouts and shader modules of one linked program.
#[derive(Debug)]
pub(crate) struct ProgramLayout {
    pub uniforms: wgpu::BindGroupLayout,
    pub textures: Option<wgpu::BindGroupLayout>,
    pub pipeline: wgpu::PipelineLayout,
}

impl ProgramLayout {
    /// Group 0 holds the uniform block at a dynamic offset; group 1 the
    /// sampled texture and its sampler.
    pub(crate) fn new(
        device: &wgpu::Device,
        uniform_slot: u64,
        texture: Option<TextureKind>,
    ) -> Self {
        let uniforms = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniform_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(uniform_slot),
                },
                count: None,
            }],
        });

        let textures = texture.map(|kind| {
            let view_dimension = match kind {
                TextureKind::D2 => wgpu::TextureViewDimension::D2,
                TextureKind::Cube => wgpu::TextureViewDimension::Cube,
            };
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("texture_bind_group_layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            })
        });

        let mut groups = vec![&uniforms];
        groups.extend(textures.as_ref());
        let pipeline = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("program_pipeline_layout"),
            bind_group_layouts: &groups,
            push_constant_ranges: &[],
        });

        Self {
            uniforms,
            textures,
            pipeline,
        }
    }
}

pub(crate) fn create_pipeline(
    device: &wgpu::Device,
    key: &PipelineKey,
    layout: &ProgramLayout,
    vertex: &wgpu::ShaderModule,
    fragment: &wgpu::ShaderModule,
    attributes: &[VertexAttribute],
) -> Result<wgpu::RenderPipeline, RenderError> {
    let wgpu_attributes = convert::vertex_attributes(attributes)?;
    let color_target = Some(wgpu::ColorTargetState {
        format: key.target.color,
        blend: Some(key.blend_state()),
        write_mask: wgpu::ColorWrites::ALL,
    });
    let targets = vec![color_target; usize::from(key.target.color_count)];

    let scope = ValidationScope::new(device);
    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("orrery_pipeline"),
        layout: Some(&layout.pipeline),
        vertex: wgpu::VertexState {
            module: vertex,
            entry_point: Some(ENTRY_POINT),
            compilation_options: Default::default(),
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: u64::from(vertex_stride(attributes)),
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &wgpu_attributes,
            }],
        },
        fragment: Some(wgpu::FragmentState {
            module: fragment,
            entry_point: Some(ENTRY_POINT),
            compilation_options: Default::default(),
            targets: &targets,
        }),
        primitive: wgpu::PrimitiveState {
            topology: convert::topology(key.topology),
            front_face: convert::front_face(key.front),
            cull_mode: convert::cull_mode(key.cull),
            ..Default::default()
        },
        depth_stencil: key.depth_stencil(),
        multisample: Default::default(),
        multiview: None,
        cache: None,
    });
    scope
        .end()
        .map_err(|err| RenderError::creation(ResourceKind::Program, err.to_string()))?;
    tracing::debug!(?key, "created pipeline");
    Ok(pipeline)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::COLOR_FORMAT;

    fn key(depth: bool, test: bool, write: bool) -> PipelineKey {
        PipelineKey {
            program: ProgramId::default(),
            layout: LayoutId::default(),
            topology: PrimitiveTopology::TriangleList,
            blend: false,
            depth_test: test,
            depth_write: write,
            cull: CullMode::None,
            front: FrontFace::Ccw,
            target: TargetFormat {
                color: COLOR_FORMAT,
                color_count: 1,
                depth,
            },
        }
    }

    #[test]
    fn depth_write_requires_depth_test() {
        let state = key(true, false, true).depth_stencil().unwrap();
        assert!(!state.depth_write_enabled);
        assert_eq!(state.depth_compare, wgpu::CompareFunction::Always);

        let state = key(true, true, true).depth_stencil().unwrap();
        assert!(state.depth_write_enabled);
        assert_eq!(state.depth_compare, wgpu::CompareFunction::Less);
    }

    #[test]
    fn targets_without_depth_have_no_depth_state() {
        assert!(key(false, true, true).depth_stencil().is_none());
    }

    #[test]
    fn blend_flag_selects_alpha_blending() {
        let mut k = key(false, false, false);
        assert_eq!(k.blend_state(), wgpu::BlendState::REPLACE);
        k.blend = true;
        assert_eq!(k.blend_state(), wgpu::BlendState::ALPHA_BLENDING);
    }
}
