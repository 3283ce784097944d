use crate::config::AppConfig;
use crate::controller::Controller;
use crate::error::{AppError, Stage, StartupError};
use crate::platform::Platform;
use glam::Mat4;
use orrery_common::{Clock, Time};
use orrery_input::{InputSink, Key, Keyboard, Mouse, MouseButton};
use orrery_kernel::{SolarSystem, SystemDesc};
use orrery_render::loader::{create_shader_program_from_files, create_texture_from_file};
use orrery_render::{
    AddressMode, AttributeFormat, BufferUsage, Camera, CullMode, DebugOverlay, FilterMode,
    Framebuffer, FramebufferFormat, FrontFace, Mesh, PrimitiveTopology, RenderBackend,
    RenderError, SamplerDesc, SamplerState, ShaderProgram, Skybox, Texture, Vertex2d, Vertex3d,
    VertexBuffer, VertexLayout,
};
use std::f32::consts::FRAC_PI_4;

const CLEAR_COLOR: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

#[rustfmt::skip]
const SCREEN_QUAD: [Vertex2d; 6] = [
    Vertex2d::new(-1.0,  1.0, 0.0, 1.0),
    Vertex2d::new( 1.0,  1.0, 1.0, 1.0),
    Vertex2d::new( 1.0, -1.0, 1.0, 0.0),
    Vertex2d::new( 1.0, -1.0, 1.0, 0.0),
    Vertex2d::new(-1.0, -1.0, 0.0, 0.0),
    Vertex2d::new(-1.0,  1.0, 0.0, 1.0),
];

/// Textured cube, clockwise front faces.
#[rustfmt::skip]
const CUBE: [Vertex3d; 36] = [
    // front
    Vertex3d::new(-1.0,  1.0,  1.0, 0.0, 1.0),
    Vertex3d::new( 1.0,  1.0,  1.0, 1.0, 1.0),
    Vertex3d::new( 1.0, -1.0,  1.0, 1.0, 0.0),
    Vertex3d::new( 1.0, -1.0,  1.0, 1.0, 0.0),
    Vertex3d::new(-1.0, -1.0,  1.0, 0.0, 0.0),
    Vertex3d::new(-1.0,  1.0,  1.0, 0.0, 1.0),
    // right
    Vertex3d::new( 1.0,  1.0,  1.0, 0.0, 1.0),
    Vertex3d::new( 1.0,  1.0, -1.0, 1.0, 1.0),
    Vertex3d::new( 1.0, -1.0, -1.0, 1.0, 0.0),
    Vertex3d::new( 1.0, -1.0, -1.0, 1.0, 0.0),
    Vertex3d::new( 1.0, -1.0,  1.0, 0.0, 0.0),
    Vertex3d::new( 1.0,  1.0,  1.0, 0.0, 1.0),
    // back
    Vertex3d::new( 1.0,  1.0, -1.0, 0.0, 1.0),
    Vertex3d::new(-1.0,  1.0, -1.0, 1.0, 1.0),
    Vertex3d::new(-1.0, -1.0, -1.0, 1.0, 0.0),
    Vertex3d::new(-1.0, -1.0, -1.0, 1.0, 0.0),
    Vertex3d::new( 1.0, -1.0, -1.0, 0.0, 0.0),
    Vertex3d::new( 1.0,  1.0, -1.0, 0.0, 1.0),
    // left
    Vertex3d::new(-1.0,  1.0, -1.0, 0.0, 1.0),
    Vertex3d::new(-1.0,  1.0,  1.0, 1.0, 1.0),
    Vertex3d::new(-1.0, -1.0,  1.0, 1.0, 0.0),
    Vertex3d::new(-1.0, -1.0,  1.0, 1.0, 0.0),
    Vertex3d::new(-1.0, -1.0, -1.0, 0.0, 0.0),
    Vertex3d::new(-1.0,  1.0, -1.0, 0.0, 1.0),
    // top
    Vertex3d::new( 1.0,  1.0,  1.0, 0.0, 1.0),
    Vertex3d::new(-1.0,  1.0,  1.0, 1.0, 1.0),
    Vertex3d::new(-1.0,  1.0, -1.0, 1.0, 0.0),
    Vertex3d::new(-1.0,  1.0, -1.0, 1.0, 0.0),
    Vertex3d::new( 1.0,  1.0, -1.0, 0.0, 0.0),
    Vertex3d::new( 1.0,  1.0,  1.0, 0.0, 1.0),
    // bottom
    Vertex3d::new(-1.0, -1.0,  1.0, 0.0, 1.0),
    Vertex3d::new( 1.0, -1.0,  1.0, 1.0, 1.0),
    Vertex3d::new( 1.0, -1.0, -1.0, 1.0, 0.0),
    Vertex3d::new( 1.0, -1.0, -1.0, 1.0, 0.0),
    Vertex3d::new(-1.0, -1.0, -1.0, 0.0, 0.0),
    Vertex3d::new(-1.0, -1.0,  1.0, 0.0, 1.0),
];

/// Lifecycle of an [`Application`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Uninitialized,
    Running,
}

/// The demo: a skybox and a solar system of textured cubes, rendered to a
/// small offscreen target, upscaled to the window, with an FPS overlay.
///
/// Owns every render resource it draws with. Meshes and the overlay refer to
/// shared programs, textures, samplers and layouts by handle.
pub struct Application<B: RenderBackend> {
    config: AppConfig,
    backend: B,
    clock: Clock,
    state: AppState,
    running: bool,
    frames: u64,

    keyboard: Keyboard,
    mouse: Mouse,
    camera: Camera,
    controller: Controller,
    system: SolarSystem,

    rendertarget: Framebuffer,
    program_world: ShaderProgram,
    program_final: ShaderProgram,
    program_font: ShaderProgram,
    texture_font: Texture,
    body_textures: Vec<Texture>,
    sampler_nearest: SamplerState,
    sampler_linear: SamplerState,
    screen_quad: VertexBuffer,
    layout_2d: VertexLayout,
    layout_3d: VertexLayout,
    skybox: Skybox,
    meshes: Vec<Mesh>,
    overlay: DebugOverlay,
}

impl<B: RenderBackend> Application<B> {
    /// Loads the body table named by `config.system`, or the built-in one.
    /// No backend resources are created yet.
    pub fn new(config: AppConfig, backend: B) -> Result<Self, AppError> {
        let desc = match &config.system {
            Some(path) => SystemDesc::load(path)?,
            None => SystemDesc::builtin(),
        };
        let system = SolarSystem::new(&desc)?;
        let projection = Mat4::perspective_rh(FRAC_PI_4, config.aspect(), 1.0, 1000.0);

        Ok(Self {
            config,
            backend,
            clock: Clock::new(),
            state: AppState::Uninitialized,
            running: false,
            frames: 0,
            keyboard: Keyboard::new(),
            mouse: Mouse::new(),
            camera: Camera::new(projection),
            controller: Controller::new(),
            system,
            rendertarget: Framebuffer::new(),
            program_world: ShaderProgram::new(),
            program_final: ShaderProgram::new(),
            program_font: ShaderProgram::new(),
            texture_font: Texture::new(),
            body_textures: Vec::new(),
            sampler_nearest: SamplerState::new(),
            sampler_linear: SamplerState::new(),
            screen_quad: VertexBuffer::new(),
            layout_2d: VertexLayout::new(),
            layout_3d: VertexLayout::new(),
            skybox: Skybox::new(),
            meshes: Vec::new(),
            overlay: DebugOverlay::new(),
        })
    }

    /// Replaces the frame clock, e.g. with a scripted one.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn state(&self) -> AppState {
        self.state
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn controller_mut(&mut self) -> &mut Controller {
        &mut self.controller
    }

    pub fn system(&self) -> &SolarSystem {
        &self.system
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    pub fn overlay(&self) -> &DebugOverlay {
        &self.overlay
    }

    /// Frames completed by the loop so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Brings the platform up, creates every resource and runs frames until
    /// the window closes or Escape is released. Nothing is drawn if any
    /// startup step fails.
    pub fn run(&mut self, platform: &mut impl Platform) -> Result<(), AppError> {
        if !platform.is_valid() {
            tracing::error!("could not initialize context!");
            return Err(AppError::Context);
        }
        self.create_resources()?;

        self.state = AppState::Running;
        self.running = true;
        self.clock.tick();
        tracing::info!(bodies = self.system.len(), "entering frame loop");

        while self.frame(platform) {}

        tracing::info!(frames = self.frames, "frame loop finished");
        Ok(())
    }

    /// Runs one iteration: poll, tick, draw, age input. Returns whether the
    /// loop should continue.
    pub fn frame(&mut self, platform: &mut impl Platform) -> bool {
        if !self.running || !platform.poll_events(self) {
            return false;
        }
        let dt = self.clock.tick();
        self.tick(dt);
        self.draw();
        self.post_frame();
        self.frames += 1;
        true
    }

    /// Creates all resources in startup order, stopping at the first stage
    /// that fails.
    pub fn create_resources(&mut self) -> Result<(), StartupError> {
        for stage in Stage::ALL {
            let result = match stage {
                Stage::Framebuffers => self.create_framebuffers(),
                Stage::Shaders => self.create_shaders(),
                Stage::Textures => self.create_textures(),
                Stage::Samplers => self.create_samplers(),
                Stage::Buffers => self.create_buffers(),
                Stage::Layouts => self.create_layouts(),
                Stage::Skybox => self.create_skybox(),
                Stage::Models => self.create_models(),
                Stage::Misc => self.create_misc(),
            };
            if let Err(source) = result {
                tracing::error!(%source, "could not create {stage}!");
                return Err(StartupError { stage, source });
            }
            tracing::debug!(%stage, "created");
        }
        Ok(())
    }

    fn create_framebuffers(&mut self) -> Result<(), RenderError> {
        self.rendertarget.create(
            &mut self.backend,
            self.config.offscreen_width,
            self.config.offscreen_height,
            &[FramebufferFormat::Rgba8, FramebufferFormat::D32],
        )
    }

    fn create_shaders(&mut self) -> Result<(), RenderError> {
        let dir = self.config.data_dir.clone();
        for (program, name) in [
            (&mut self.program_world, "world"),
            (&mut self.program_final, "final"),
            (&mut self.program_font, "font"),
        ] {
            create_shader_program_from_files(
                &mut self.backend,
                program,
                &dir.join(format!("{name}.vs.glsl")),
                &dir.join(format!("{name}.fs.glsl")),
            )?;
        }
        Ok(())
    }

    fn create_textures(&mut self) -> Result<(), RenderError> {
        let dir = &self.config.data_dir;
        create_texture_from_file(
            &mut self.backend,
            &mut self.texture_font,
            &dir.join(orrery_assets::FONT_ATLAS),
        )?;
        for body in self.system.bodies() {
            let mut texture = Texture::new();
            create_texture_from_file(&mut self.backend, &mut texture, &dir.join(&body.texture))?;
            self.body_textures.push(texture);
        }
        Ok(())
    }

    fn create_samplers(&mut self) -> Result<(), RenderError> {
        self.sampler_nearest.create(
            &mut self.backend,
            SamplerDesc::new(FilterMode::Nearest, AddressMode::Clamp, AddressMode::Clamp),
        )?;
        self.sampler_linear.create(
            &mut self.backend,
            SamplerDesc::new(FilterMode::Linear, AddressMode::Clamp, AddressMode::Clamp),
        )
    }

    fn create_buffers(&mut self) -> Result<(), RenderError> {
        self.screen_quad.create(
            &mut self.backend,
            BufferUsage::Static,
            bytemuck::cast_slice(&SCREEN_QUAD),
        )
    }

    fn create_layouts(&mut self) -> Result<(), RenderError> {
        self.layout_3d
            .add_attribute(0, AttributeFormat::Float, 3, false)
            .add_attribute(1, AttributeFormat::Float, 2, false)
            .create(&mut self.backend)?;
        self.layout_2d
            .add_attribute(0, AttributeFormat::Float, 2, false)
            .add_attribute(1, AttributeFormat::Float, 2, false)
            .create(&mut self.backend)
    }

    fn create_skybox(&mut self) -> Result<(), RenderError> {
        let dir = self.config.data_dir.join("skybox");
        self.skybox.create(&mut self.backend, &dir)
    }

    fn create_models(&mut self) -> Result<(), RenderError> {
        let layout = self.layout_3d.id()?;
        let program = self.program_world.id()?;
        let sampler = self.sampler_linear.id()?;

        for (index, texture) in self.body_textures.iter().enumerate() {
            let mut mesh = Mesh::new(layout);
            mesh.material.set_shader_program(program);
            mesh.material.set_texture(texture.id()?);
            mesh.material.set_sampler_state(sampler);
            mesh.set_transform(self.system.transform(index).unwrap_or(Mat4::IDENTITY));
            mesh.create(
                &mut self.backend,
                PrimitiveTopology::TriangleList,
                std::mem::size_of::<Vertex3d>() as u32,
                CUBE.len() as u32,
                bytemuck::cast_slice(&CUBE),
            )?;
            self.meshes.push(mesh);
        }
        Ok(())
    }

    fn create_misc(&mut self) -> Result<(), RenderError> {
        self.overlay.setup(
            self.program_font.id()?,
            self.texture_font.id()?,
            self.sampler_nearest.id()?,
            self.layout_2d.id()?,
        );
        Ok(())
    }

    /// Advances the simulation and camera by `dt` and queues the overlay text.
    pub fn tick(&mut self, dt: Time) {
        if self.keyboard.key_released(Key::ESCAPE) {
            self.running = false;
        }

        self.controller
            .update(&mut self.camera, &self.keyboard, &self.mouse, dt);

        self.system.advance(dt.as_seconds());
        for (mesh, transform) in self.meshes.iter_mut().zip(self.system.transforms()) {
            mesh.set_transform(transform);
        }

        let seconds = dt.as_seconds();
        let fps = if seconds > 0.0 { (1.0 / seconds) as i32 } else { 0 };
        let ms = dt.as_milliseconds() as i32;
        self.overlay.pre_frame(self.config.width, self.config.height);
        self.overlay.push_line(format_args!("FPS: {fps} ({ms}ms)"));
    }

    /// Renders the three passes and presents. A failing pass drops the rest
    /// of the frame; the loop keeps going.
    pub fn draw(&mut self) {
        if let Err(err) = self.draw_passes() {
            tracing::warn!(%err, frame = self.frames, "frame incomplete");
        }
        if let Err(err) = self.backend.present() {
            tracing::warn!(%err, frame = self.frames, "present failed");
        }
    }

    fn draw_passes(&mut self) -> Result<(), RenderError> {
        self.draw_world_pass()?;
        self.draw_composite_pass()?;
        self.overlay.draw(&mut self.backend)
    }

    fn draw_world_pass(&mut self) -> Result<(), RenderError> {
        self.backend.set_framebuffer(self.rendertarget.id()?);
        let [r, g, b, a] = CLEAR_COLOR;
        self.backend.clear(r, g, b, a);

        self.skybox.draw(&mut self.backend, &self.camera)?;

        self.camera
            .bind(&mut self.backend, self.program_world.id()?);
        for mesh in &self.meshes {
            mesh.draw(&mut self.backend)?;
        }
        Ok(())
    }

    fn draw_composite_pass(&mut self) -> Result<(), RenderError> {
        let screen = self.rendertarget.color_attachment(&self.backend, 0)?;
        let backend = &mut self.backend;

        backend.reset_framebuffer();
        let [r, g, b, a] = CLEAR_COLOR;
        backend.clear(r, g, b, a);
        backend.set_viewport(0, 0, self.config.width, self.config.height);
        backend.set_shader_program(self.program_final.id()?);
        backend.set_vertex_buffer(self.screen_quad.id()?);
        backend.set_vertex_layout(self.layout_2d.id()?);
        backend.set_texture(screen);
        backend.set_sampler_state(self.sampler_nearest.id()?);
        backend.set_blend_state(false);
        backend.set_rasterizer_state(CullMode::None, FrontFace::Cw);
        backend.draw(PrimitiveTopology::TriangleList, 0, SCREEN_QUAD.len() as u32)
    }

    fn post_frame(&mut self) {
        self.mouse.update();
        self.keyboard.update();
    }

    /// Releases every resource. Safe to call more than once.
    pub fn destroy_resources(&mut self) {
        let backend: &mut dyn RenderBackend = &mut self.backend;
        for mesh in &mut self.meshes {
            mesh.destroy(backend);
        }
        self.meshes.clear();
        self.overlay.destroy(backend);
        self.skybox.destroy(backend);
        self.layout_2d.destroy(backend);
        self.layout_3d.destroy(backend);
        self.layout_2d = VertexLayout::new();
        self.layout_3d = VertexLayout::new();
        self.screen_quad.destroy(backend);
        self.sampler_nearest.destroy(backend);
        self.sampler_linear.destroy(backend);
        for texture in &mut self.body_textures {
            texture.destroy(backend);
        }
        self.body_textures.clear();
        self.texture_font.destroy(backend);
        self.program_world.destroy(backend);
        self.program_final.destroy(backend);
        self.program_font.destroy(backend);
        self.rendertarget.destroy(backend);

        self.state = AppState::Uninitialized;
        self.running = false;
    }
}

impl<B: RenderBackend> InputSink for Application<B> {
    fn on_key(&mut self, key: Key, pressed: bool) {
        self.keyboard.on_key(key, pressed);
    }

    fn on_mouse(&mut self, x: i32, y: i32) {
        self.mouse.on_move(x, y);
    }

    fn on_button(&mut self, button: MouseButton, pressed: bool) {
        self.mouse.on_button(button, pressed);
    }
}
