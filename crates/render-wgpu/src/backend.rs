use crate::convert::{self, COLOR_FORMAT, DEPTH_FORMAT};
use crate::frame::{DrawRecord, FrameRecorder, MIN_UNIFORM_SLOT, PassRecord, Target, TextureBinding};
use crate::pipeline::{PipelineKey, ProgramLayout, TargetFormat, create_pipeline};
use crate::shader::{ValidationScope, create_module};
use orrery_render::{
    BufferId, BufferUsage, CubemapId, CullMode, FramebufferFormat, FramebufferId, FrontFace,
    LayoutId, PrimitiveTopology, ProgramId, RenderBackend, RenderError, ResourceKind, SamplerDesc,
    SamplerId, ShaderReflection, TextureFormat, TextureId, TextureKind, UniformValue,
    VertexAttribute, vertex_stride,
};
use slotmap::SlotMap;
use std::collections::HashMap;
use wgpu::util::DeviceExt;

const INITIAL_RING_SIZE: u64 = 64 * 1024;

struct GpuBuffer {
    buffer: wgpu::Buffer,
    size: usize,
}

struct GpuTexture {
    view: wgpu::TextureView,
    /// Colour attachments belong to their framebuffer.
    attachment: bool,
}

struct GpuProgram {
    vertex: wgpu::ShaderModule,
    fragment: wgpu::ShaderModule,
    reflection: ShaderReflection,
    uniforms: Vec<u8>,
    layout: ProgramLayout,
}

impl GpuProgram {
    fn slot_size(&self) -> u64 {
        u64::from(self.reflection.block_size().max(MIN_UNIFORM_SLOT))
    }
}

struct GpuFramebuffer {
    width: u32,
    height: u32,
    colors: Vec<TextureId>,
    depth: Option<wgpu::TextureView>,
}

/// Bindings and fixed-function state waiting for the next draw.
#[derive(Debug, Clone, Copy)]
struct State {
    viewport: (i32, i32, u32, u32),
    program: Option<ProgramId>,
    buffer: Option<BufferId>,
    layout: Option<LayoutId>,
    texture: Option<TextureId>,
    cubemap: Option<CubemapId>,
    sampler: Option<SamplerId>,
    blend: bool,
    depth_test: bool,
    depth_write: bool,
    cull: CullMode,
    front: FrontFace,
}

/// [`RenderBackend`] on wgpu, drawing to a window surface.
///
/// Binding calls only update local state. Each draw validates that state,
/// resolves a cached pipeline and is recorded with a copy of its program's
/// uniforms; [`RenderBackend::present`] encodes the frame's passes, submits
/// and presents. Buffer updates are queued writes and therefore become
/// visible for the whole frame at submit.
pub struct WgpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
    window_depth: wgpu::TextureView,
    buffers: SlotMap<BufferId, GpuBuffer>,
    textures: SlotMap<TextureId, GpuTexture>,
    cubemaps: SlotMap<CubemapId, wgpu::TextureView>,
    samplers: SlotMap<SamplerId, wgpu::Sampler>,
    programs: SlotMap<ProgramId, GpuProgram>,
    layouts: SlotMap<LayoutId, Vec<VertexAttribute>>,
    framebuffers: SlotMap<FramebufferId, GpuFramebuffer>,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
    uniform_ring: wgpu::Buffer,
    frame: FrameRecorder,
    state: State,
}

impl WgpuBackend {
    /// Opens a device for `target` and configures its surface at the given
    /// size with vsync.
    pub fn new(
        target: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
    ) -> Result<Self, RenderError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(target)
            .map_err(|err| RenderError::Surface(err.to_string()))?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or_else(|| RenderError::Surface("no compatible graphics adapter".into()))?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("orrery_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .map_err(|err| RenderError::Surface(err.to_string()))?;
        device.on_uncaptured_error(Box::new(|err| {
            tracing::error!(%err, "uncaptured wgpu error");
        }));

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or(caps.formats.first())
            .copied()
            .ok_or_else(|| RenderError::Surface("surface supports no formats".into()))?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        tracing::info!(
            backend = adapter.get_info().backend.to_str(),
            ?format,
            width = config.width,
            height = config.height,
            "GPU initialized"
        );

        let window_depth = depth_view(&device, config.width, config.height);
        let uniform_ring = ring_buffer(&device, INITIAL_RING_SIZE);
        let alignment = device.limits().min_uniform_buffer_offset_alignment;

        Ok(Self {
            device,
            queue,
            surface,
            window_depth,
            buffers: SlotMap::with_key(),
            textures: SlotMap::with_key(),
            cubemaps: SlotMap::with_key(),
            samplers: SlotMap::with_key(),
            programs: SlotMap::with_key(),
            layouts: SlotMap::with_key(),
            framebuffers: SlotMap::with_key(),
            pipelines: HashMap::new(),
            uniform_ring,
            frame: FrameRecorder::new(alignment),
            state: State {
                viewport: (0, 0, config.width, config.height),
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
            },
            config,
        })
    }

    pub fn surface_size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    /// Reconfigures the surface and its depth buffer.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.config.width = width.max(1);
        self.config.height = height.max(1);
        self.surface.configure(&self.device, &self.config);
        self.window_depth = depth_view(&self.device, self.config.width, self.config.height);
    }

    fn upload_texture(
        &self,
        label: &str,
        format: TextureFormat,
        width: u32,
        height: u32,
        layers: &[&[u8]],
        kind: ResourceKind,
    ) -> Result<wgpu::Texture, RenderError> {
        if width == 0 || height == 0 {
            return Err(RenderError::creation(kind, "zero-sized image"));
        }
        let expected = width as usize * height as usize * format.bytes_per_pixel();
        let mut data = Vec::with_capacity(width as usize * height as usize * 4 * layers.len());
        for layer in layers {
            if layer.len() != expected {
                return Err(RenderError::creation(
                    kind,
                    format!("expected {expected} bytes of pixel data, got {}", layer.len()),
                ));
            }
            data.extend_from_slice(&convert::rgba_pixels(format, layer));
        }

        let scope = ValidationScope::new(&self.device);
        let texture = self.device.create_texture_with_data(
            &self.queue,
            &wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: layers.len() as u32,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: COLOR_FORMAT,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            &data,
        );
        scope
            .end()
            .map_err(|err| RenderError::creation(kind, err.to_string()))?;
        Ok(texture)
    }

    fn target_format(&self, target: Target) -> Result<TargetFormat, RenderError> {
        match target {
            Target::Window => Ok(TargetFormat {
                color: self.config.format,
                color_count: 1,
                depth: true,
            }),
            Target::Framebuffer(id) => {
                let fb = self
                    .framebuffers
                    .get(id)
                    .ok_or(RenderError::InvalidHandle(ResourceKind::Framebuffer))?;
                Ok(TargetFormat {
                    color: COLOR_FORMAT,
                    color_count: fb.colors.len() as u8,
                    depth: fb.depth.is_some(),
                })
            }
        }
    }

    fn target_size(&self, target: Target) -> (u32, u32) {
        match target {
            Target::Window => (self.config.width, self.config.height),
            Target::Framebuffer(id) => self
                .framebuffers
                .get(id)
                .map_or((1, 1), |fb| (fb.width, fb.height)),
        }
    }

    fn texture_binding(&self, kind: Option<TextureKind>) -> Result<Option<TextureBinding>, RenderError> {
        let Some(kind) = kind else {
            return Ok(None);
        };
        let sampler = self
            .state
            .sampler
            .ok_or(RenderError::MissingBinding("sampler"))?;
        if !self.samplers.contains_key(sampler) {
            return Err(RenderError::InvalidHandle(ResourceKind::Sampler));
        }
        match kind {
            TextureKind::D2 => {
                let texture = self
                    .state
                    .texture
                    .ok_or(RenderError::MissingBinding("texture"))?;
                if !self.textures.contains_key(texture) {
                    return Err(RenderError::InvalidHandle(ResourceKind::Texture));
                }
                if let Target::Framebuffer(fb) = self.frame.target() {
                    if self
                        .framebuffers
                        .get(fb)
                        .is_some_and(|fb| fb.colors.contains(&texture))
                    {
                        return Err(RenderError::MissingBinding(
                            "texture distinct from the current target",
                        ));
                    }
                }
                Ok(Some(TextureBinding::D2(texture, sampler)))
            }
            TextureKind::Cube => {
                let cubemap = self
                    .state
                    .cubemap
                    .ok_or(RenderError::MissingBinding("cubemap"))?;
                if !self.cubemaps.contains_key(cubemap) {
                    return Err(RenderError::InvalidHandle(ResourceKind::Cubemap));
                }
                Ok(Some(TextureBinding::Cube(cubemap, sampler)))
            }
        }
    }

    fn ensure_pipeline(&mut self, key: &PipelineKey) -> Result<(), RenderError> {
        if self.pipelines.contains_key(key) {
            return Ok(());
        }
        let program = self
            .programs
            .get(key.program)
            .ok_or(RenderError::InvalidHandle(ResourceKind::Program))?;
        let attributes = self
            .layouts
            .get(key.layout)
            .ok_or(RenderError::InvalidHandle(ResourceKind::Layout))?;
        let pipeline = create_pipeline(
            &self.device,
            key,
            &program.layout,
            &program.vertex,
            &program.fragment,
            attributes,
        )?;
        self.pipelines.insert(*key, pipeline);
        Ok(())
    }

    fn upload_uniforms(&mut self, data: &[u8]) {
        if data.is_empty() {
            return;
        }
        let needed = data.len() as u64;
        if self.uniform_ring.size() < needed {
            let size = needed.next_power_of_two().max(INITIAL_RING_SIZE);
            tracing::debug!(size, "growing uniform ring");
            self.uniform_ring = ring_buffer(&self.device, size);
        }
        self.queue.write_buffer(&self.uniform_ring, 0, data);
    }

    fn texture_bind_group(
        &self,
        program: &GpuProgram,
        binding: TextureBinding,
    ) -> Option<wgpu::BindGroup> {
        let layout = program.layout.textures.as_ref()?;
        let (view, sampler) = match binding {
            TextureBinding::D2(texture, sampler) => {
                (&self.textures.get(texture)?.view, self.samplers.get(sampler)?)
            }
            TextureBinding::Cube(cubemap, sampler) => {
                (self.cubemaps.get(cubemap)?, self.samplers.get(sampler)?)
            }
        };
        Some(self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("texture_bind_group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        }))
    }

    fn uniform_bind_group(&self, program: &GpuProgram) -> wgpu::BindGroup {
        self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("uniform_bind_group"),
            layout: &program.layout.uniforms,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &self.uniform_ring,
                    offset: 0,
                    size: wgpu::BufferSize::new(program.slot_size()),
                }),
            }],
        })
    }

    /// Encodes the recorded passes. Draws whose resources were destroyed
    /// after recording are skipped.
    fn encode(&self, passes: &[PassRecord], window: &wgpu::TextureView) -> wgpu::CommandBuffer {
        let mut uniform_groups: HashMap<ProgramId, wgpu::BindGroup> = HashMap::new();
        for draw in passes.iter().flat_map(|p| &p.draws) {
            if let Some(program) = self.programs.get(draw.program) {
                uniform_groups
                    .entry(draw.program)
                    .or_insert_with(|| self.uniform_bind_group(program));
            }
        }

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame_encoder"),
            });

        for pass in passes {
            let (colors, depth): (Vec<&wgpu::TextureView>, Option<&wgpu::TextureView>) =
                match pass.target {
                    Target::Window => (vec![window], Some(&self.window_depth)),
                    Target::Framebuffer(id) => match self.framebuffers.get(id) {
                        Some(fb) => (
                            fb.colors
                                .iter()
                                .filter_map(|c| self.textures.get(*c))
                                .map(|t| &t.view)
                                .collect(),
                            fb.depth.as_ref(),
                        ),
                        None => {
                            tracing::warn!("skipping pass on destroyed framebuffer");
                            continue;
                        }
                    },
                };

            let load = match pass.clear {
                Some([r, g, b, a]) => wgpu::LoadOp::Clear(wgpu::Color {
                    r: f64::from(r),
                    g: f64::from(g),
                    b: f64::from(b),
                    a: f64::from(a),
                }),
                None => wgpu::LoadOp::Load,
            };
            let color_attachments: Vec<_> = colors
                .into_iter()
                .map(|view| {
                    Some(wgpu::RenderPassColorAttachment {
                        view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load,
                            store: wgpu::StoreOp::Store,
                        },
                    })
                })
                .collect();
            let depth_load = if pass.clear.is_some() {
                wgpu::LoadOp::Clear(1.0)
            } else {
                wgpu::LoadOp::Load
            };

            let (target_width, target_height) = self.target_size(pass.target);
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("orrery_pass"),
                color_attachments: &color_attachments,
                depth_stencil_attachment: depth.map(|view| wgpu::RenderPassDepthStencilAttachment {
                    view,
                    depth_ops: Some(wgpu::Operations {
                        load: depth_load,
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            for draw in &pass.draws {
                let (Some(pipeline), Some(program), Some(buffer), Some(uniforms)) = (
                    self.pipelines.get(&draw.pipeline),
                    self.programs.get(draw.program),
                    self.buffers.get(draw.buffer),
                    uniform_groups.get(&draw.program),
                ) else {
                    tracing::warn!("skipping draw with destroyed resources");
                    continue;
                };
                let textures = match draw.textures {
                    Some(binding) => match self.texture_bind_group(program, binding) {
                        Some(group) => Some(group),
                        None => {
                            tracing::warn!("skipping draw with destroyed textures");
                            continue;
                        }
                    },
                    None => None,
                };

                let (x, y, w, h) = draw.viewport;
                let x = (x.max(0) as u32).min(target_width);
                let y = (y.max(0) as u32).min(target_height);
                let w = w.min(target_width - x);
                let h = h.min(target_height - y);
                if w == 0 || h == 0 {
                    continue;
                }

                rpass.set_pipeline(pipeline);
                rpass.set_bind_group(0, uniforms, &[draw.uniform_offset]);
                if let Some(group) = &textures {
                    rpass.set_bind_group(1, group, &[]);
                }
                rpass.set_vertex_buffer(0, buffer.buffer.slice(..));
                rpass.set_viewport(x as f32, y as f32, w as f32, h as f32, 0.0, 1.0);
                rpass.draw(draw.first..draw.first + draw.count, 0..1);
            }
        }

        encoder.finish()
    }
}

impl RenderBackend for WgpuBackend {
    fn create_buffer(&mut self, usage: BufferUsage, data: &[u8]) -> Result<BufferId, RenderError> {
        if data.is_empty() {
            return Err(RenderError::creation(ResourceKind::Buffer, "empty buffer"));
        }
        let scope = ValidationScope::new(&self.device);
        let buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(match usage {
                    BufferUsage::Static => "static_vertex_buffer",
                    BufferUsage::Dynamic => "dynamic_vertex_buffer",
                }),
                contents: data,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            });
        scope
            .end()
            .map_err(|err| RenderError::creation(ResourceKind::Buffer, err.to_string()))?;
        Ok(self.buffers.insert(GpuBuffer {
            buffer,
            size: data.len(),
        }))
    }

    fn update_buffer(&mut self, id: BufferId, data: &[u8]) -> Result<(), RenderError> {
        let gpu = self
            .buffers
            .get(id)
            .ok_or(RenderError::InvalidHandle(ResourceKind::Buffer))?;
        if data.len() > gpu.size {
            return Err(RenderError::DrawOutOfRange {
                needed: data.len(),
                available: gpu.size,
            });
        }
        let align = wgpu::COPY_BUFFER_ALIGNMENT as usize;
        if data.len() % align == 0 {
            self.queue.write_buffer(&gpu.buffer, 0, data);
        } else {
            let mut padded = data.to_vec();
            padded.resize(data.len().next_multiple_of(align), 0);
            self.queue.write_buffer(&gpu.buffer, 0, &padded);
        }
        Ok(())
    }

    fn destroy_buffer(&mut self, id: BufferId) {
        if let Some(gpu) = self.buffers.remove(id) {
            gpu.buffer.destroy();
        }
    }

    fn create_texture(
        &mut self,
        format: TextureFormat,
        width: u32,
        height: u32,
        data: &[u8],
    ) -> Result<TextureId, RenderError> {
        let texture =
            self.upload_texture("texture", format, width, height, &[data], ResourceKind::Texture)?;
        Ok(self.textures.insert(GpuTexture {
            view: texture.create_view(&Default::default()),
            attachment: false,
        }))
    }

    fn destroy_texture(&mut self, id: TextureId) {
        match self.textures.get(id) {
            Some(texture) if texture.attachment => {
                tracing::warn!("framebuffer attachments are destroyed with their framebuffer");
            }
            Some(_) => {
                self.textures.remove(id);
            }
            None => {}
        }
    }

    fn create_cubemap(
        &mut self,
        format: TextureFormat,
        width: u32,
        height: u32,
        faces: [&[u8]; 6],
    ) -> Result<CubemapId, RenderError> {
        if width != height {
            return Err(RenderError::creation(
                ResourceKind::Cubemap,
                format!("faces must be square, got {width}x{height}"),
            ));
        }
        let texture =
            self.upload_texture("cubemap", format, width, height, &faces, ResourceKind::Cubemap)?;
        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("cubemap_view"),
            dimension: Some(wgpu::TextureViewDimension::Cube),
            ..Default::default()
        });
        Ok(self.cubemaps.insert(view))
    }

    fn destroy_cubemap(&mut self, id: CubemapId) {
        self.cubemaps.remove(id);
    }

    fn create_sampler(&mut self, desc: &SamplerDesc) -> Result<SamplerId, RenderError> {
        let sampler = self
            .device
            .create_sampler(&convert::sampler_descriptor(desc));
        Ok(self.samplers.insert(sampler))
    }

    fn destroy_sampler(&mut self, id: SamplerId) {
        self.samplers.remove(id);
    }

    fn create_shader_program(
        &mut self,
        vertex: &str,
        fragment: &str,
    ) -> Result<ProgramId, RenderError> {
        let reflection = ShaderReflection::program(vertex, fragment)?;
        let vertex = create_module(&self.device, "vertex", vertex, naga::ShaderStage::Vertex)?;
        let fragment =
            create_module(&self.device, "fragment", fragment, naga::ShaderStage::Fragment)?;

        let slot = u64::from(reflection.block_size().max(MIN_UNIFORM_SLOT));
        let layout = ProgramLayout::new(&self.device, slot, reflection.texture);
        let uniforms = vec![0; reflection.block_size() as usize];
        Ok(self.programs.insert(GpuProgram {
            vertex,
            fragment,
            reflection,
            uniforms,
            layout,
        }))
    }

    fn destroy_shader_program(&mut self, id: ProgramId) {
        if self.programs.remove(id).is_some() {
            self.pipelines.retain(|key, _| key.program != id);
        }
    }

    fn create_vertex_layout(
        &mut self,
        attributes: &[VertexAttribute],
    ) -> Result<LayoutId, RenderError> {
        convert::vertex_attributes(attributes)?;
        Ok(self.layouts.insert(attributes.to_vec()))
    }

    fn destroy_vertex_layout(&mut self, id: LayoutId) {
        if self.layouts.remove(id).is_some() {
            self.pipelines.retain(|key, _| key.layout != id);
        }
    }

    fn create_framebuffer(
        &mut self,
        width: u32,
        height: u32,
        formats: &[FramebufferFormat],
    ) -> Result<FramebufferId, RenderError> {
        if width == 0 || height == 0 || formats.is_empty() {
            return Err(RenderError::creation(
                ResourceKind::Framebuffer,
                "framebuffer needs a size and at least one attachment",
            ));
        }
        let depth_count = formats.iter().filter(|f| f.is_depth()).count();
        if depth_count > 1 {
            return Err(RenderError::creation(
                ResourceKind::Framebuffer,
                "more than one depth attachment",
            ));
        }

        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let colors = formats
            .iter()
            .filter(|f| !f.is_depth())
            .map(|_| {
                let texture = self.device.create_texture(&wgpu::TextureDescriptor {
                    label: Some("framebuffer_color"),
                    size,
                    mip_level_count: 1,
                    sample_count: 1,
                    dimension: wgpu::TextureDimension::D2,
                    format: COLOR_FORMAT,
                    usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                        | wgpu::TextureUsages::TEXTURE_BINDING,
                    view_formats: &[],
                });
                self.textures.insert(GpuTexture {
                    view: texture.create_view(&Default::default()),
                    attachment: true,
                })
            })
            .collect();
        let depth = (depth_count == 1).then(|| depth_view(&self.device, width, height));

        tracing::debug!(width, height, ?formats, "created framebuffer");
        Ok(self.framebuffers.insert(GpuFramebuffer {
            width,
            height,
            colors,
            depth,
        }))
    }

    fn framebuffer_color_attachment(&self, id: FramebufferId, index: usize) -> Option<TextureId> {
        self.framebuffers.get(id)?.colors.get(index).copied()
    }

    fn destroy_framebuffer(&mut self, id: FramebufferId) {
        if let Some(fb) = self.framebuffers.remove(id) {
            for texture in fb.colors {
                self.textures.remove(texture);
            }
        }
    }

    fn set_framebuffer(&mut self, id: FramebufferId) {
        self.frame.set_target(Target::Framebuffer(id));
        let (width, height) = self.target_size(Target::Framebuffer(id));
        self.state.viewport = (0, 0, width, height);
    }

    fn reset_framebuffer(&mut self) {
        self.frame.set_target(Target::Window);
        self.state.viewport = (0, 0, self.config.width, self.config.height);
    }

    fn clear(&mut self, r: f32, g: f32, b: f32, a: f32) {
        self.frame.clear([r, g, b, a]);
    }

    fn set_viewport(&mut self, x: i32, y: i32, width: u32, height: u32) {
        self.state.viewport = (x, y, width, height);
    }

    fn set_shader_program(&mut self, id: ProgramId) {
        self.state.program = Some(id);
    }

    fn set_shader_uniform(&mut self, program: ProgramId, name: &str, value: &UniformValue) {
        let Some(gpu) = self.programs.get_mut(program) else {
            return;
        };
        if let Some(block) = &gpu.reflection.block {
            block.write(&mut gpu.uniforms, name, value);
        }
    }

    fn set_vertex_buffer(&mut self, id: BufferId) {
        self.state.buffer = Some(id);
    }

    fn set_vertex_layout(&mut self, id: LayoutId) {
        self.state.layout = Some(id);
    }

    fn set_texture(&mut self, id: TextureId) {
        self.state.texture = Some(id);
    }

    fn set_cubemap(&mut self, id: CubemapId) {
        self.state.cubemap = Some(id);
    }

    fn set_sampler_state(&mut self, id: SamplerId) {
        self.state.sampler = Some(id);
    }

    fn set_blend_state(&mut self, enabled: bool) {
        self.state.blend = enabled;
    }

    fn set_depth_state(&mut self, test: bool, write: bool) {
        self.state.depth_test = test;
        self.state.depth_write = test && write;
    }

    fn set_rasterizer_state(&mut self, cull: CullMode, front: FrontFace) {
        self.state.cull = cull;
        self.state.front = front;
    }

    fn draw(
        &mut self,
        topology: PrimitiveTopology,
        first: u32,
        count: u32,
    ) -> Result<(), RenderError> {
        let program_id = self
            .state
            .program
            .ok_or(RenderError::MissingBinding("shader program"))?;
        let buffer_id = self
            .state
            .buffer
            .ok_or(RenderError::MissingBinding("vertex buffer"))?;
        let layout_id = self
            .state
            .layout
            .ok_or(RenderError::MissingBinding("vertex layout"))?;

        let program = self
            .programs
            .get(program_id)
            .ok_or(RenderError::InvalidHandle(ResourceKind::Program))?;
        let buffer = self
            .buffers
            .get(buffer_id)
            .ok_or(RenderError::InvalidHandle(ResourceKind::Buffer))?;
        let layout = self
            .layouts
            .get(layout_id)
            .ok_or(RenderError::InvalidHandle(ResourceKind::Layout))?;

        let needed = (first as usize + count as usize) * vertex_stride(layout) as usize;
        if needed > buffer.size {
            return Err(RenderError::DrawOutOfRange {
                needed,
                available: buffer.size,
            });
        }
        let textures = self.texture_binding(program.reflection.texture)?;

        let target = self.frame.target();
        let key = PipelineKey {
            program: program_id,
            layout: layout_id,
            topology,
            blend: self.state.blend,
            depth_test: self.state.depth_test,
            depth_write: self.state.depth_write,
            cull: self.state.cull,
            front: self.state.front,
            target: self.target_format(target)?,
        };
        self.ensure_pipeline(&key)?;

        let uniforms = self
            .programs
            .get(program_id)
            .map(|p| p.uniforms.clone())
            .unwrap_or_default();
        let uniform_offset = self.frame.push_uniforms(&uniforms);
        self.frame.push_draw(DrawRecord {
            pipeline: key,
            program: program_id,
            buffer: buffer_id,
            uniform_offset,
            textures,
            viewport: self.state.viewport,
            first,
            count,
        });
        Ok(())
    }

    fn present(&mut self) -> Result<(), RenderError> {
        let (passes, uniforms) = self.frame.finish();

        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                return Err(RenderError::Surface(
                    "surface lost, reconfigured; frame dropped".into(),
                ));
            }
            Err(err) => return Err(RenderError::Surface(err.to_string())),
        };

        self.upload_uniforms(&uniforms);
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let commands = self.encode(&passes, &view);
        self.queue.submit(std::iter::once(commands));
        frame.present();
        Ok(())
    }
}

fn depth_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth_texture"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&Default::default())
}

fn ring_buffer(device: &wgpu::Device, size: u64) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("uniform_ring"),
        size,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}
