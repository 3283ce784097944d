use crate::RenderBackend;
use crate::RenderError;
use crate::camera::{Camera, PROJECTION_UNIFORM, VIEW_UNIFORM};
use crate::loader::{create_cubemap_from_files, create_shader_program_from_files};
use crate::resource::{Cubemap, SamplerState, ShaderProgram, VertexBuffer, VertexLayout};
use crate::types::{
    AddressMode, AttributeFormat, BufferUsage, CullMode, FilterMode, FrontFace,
    PrimitiveTopology, ResourceKind, SamplerDesc,
};
use crate::uniform::UniformValue;
use glam::Vec4;
use orrery_assets::SKYBOX_FACES;
use std::path::Path;

const HALF_EXTENT: f32 = 2.0;

/// Six faces of two triangles each, wound for viewing from inside.
#[rustfmt::skip]
fn cube_vertices() -> [[f32; 3]; 36] {
    const Q: f32 = HALF_EXTENT;
    let v = |x, y, z| [x, y, z];
    [
        // +x
        v(Q, Q, -Q), v(Q, Q, Q), v(Q, -Q, Q),
        v(Q, -Q, Q), v(Q, -Q, -Q), v(Q, Q, -Q),
        // -x
        v(-Q, Q, Q), v(-Q, Q, -Q), v(-Q, -Q, -Q),
        v(-Q, -Q, -Q), v(-Q, -Q, Q), v(-Q, Q, Q),
        // +y
        v(-Q, Q, Q), v(Q, Q, Q), v(Q, Q, -Q),
        v(Q, Q, -Q), v(-Q, Q, -Q), v(-Q, Q, Q),
        // -y
        v(-Q, -Q, -Q), v(Q, -Q, -Q), v(Q, -Q, Q),
        v(Q, -Q, Q), v(-Q, -Q, Q), v(-Q, -Q, -Q),
        // -z
        v(-Q, Q, -Q), v(Q, Q, -Q), v(Q, -Q, -Q),
        v(Q, -Q, -Q), v(-Q, -Q, -Q), v(-Q, Q, -Q),
        // +z
        v(Q, Q, Q), v(-Q, Q, Q), v(-Q, -Q, Q),
        v(-Q, -Q, Q), v(Q, -Q, Q), v(Q, Q, Q),
    ]
}

/// A cubemap drawn on an inverted cube around the camera.
///
/// Owns its program, cubemap, sampler, buffer and layout; none of them are
/// shared with meshes.
#[derive(Debug, Default)]
pub struct Skybox {
    program: ShaderProgram,
    cubemap: Cubemap,
    sampler: SamplerState,
    buffer: VertexBuffer,
    layout: VertexLayout,
    count: u32,
}

impl Skybox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads `shader.vs.glsl`, `shader.fs.glsl` and the six faces from `dir`.
    ///
    /// On failure every part created so far is released again.
    pub fn create(
        &mut self,
        backend: &mut dyn RenderBackend,
        dir: &Path,
    ) -> Result<(), RenderError> {
        if self.program.is_valid() {
            return Err(RenderError::AlreadyCreated(ResourceKind::Program));
        }
        let result = self.create_parts(backend, dir);
        if let Err(err) = &result {
            tracing::error!(path = %dir.display(), %err, "could not create skybox");
            self.destroy(backend);
        }
        result
    }

    fn create_parts(
        &mut self,
        backend: &mut dyn RenderBackend,
        dir: &Path,
    ) -> Result<(), RenderError> {
        create_shader_program_from_files(
            backend,
            &mut self.program,
            &dir.join("shader.vs.glsl"),
            &dir.join("shader.fs.glsl"),
        )?;

        let faces = SKYBOX_FACES.map(|name| dir.join(name));
        create_cubemap_from_files(
            backend,
            &mut self.cubemap,
            faces.each_ref().map(|p| p.as_path()),
        )?;

        self.sampler.create(
            backend,
            SamplerDesc::new(FilterMode::Linear, AddressMode::Clamp, AddressMode::Clamp),
        )?;

        let vertices = cube_vertices();
        self.buffer
            .create(backend, BufferUsage::Static, bytemuck::cast_slice(&vertices))?;
        self.count = vertices.len() as u32;

        self.layout = VertexLayout::new();
        self.layout
            .add_attribute(0, AttributeFormat::Float, 3, false)
            .create(backend)?;
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.program.is_valid()
            && self.cubemap.is_valid()
            && self.sampler.is_valid()
            && self.buffer.is_valid()
            && self.layout.is_valid()
    }

    pub fn destroy(&mut self, backend: &mut dyn RenderBackend) {
        self.program.destroy(backend);
        self.cubemap.destroy(backend);
        self.sampler.destroy(backend);
        self.buffer.destroy(backend);
        self.layout.destroy(backend);
        self.count = 0;
    }

    /// Draws with the camera's rotation only, behind everything else.
    pub fn draw(&self, backend: &mut dyn RenderBackend, camera: &Camera) -> Result<(), RenderError> {
        let program = self.program.id()?;
        let mut view = camera.view();
        view.w_axis = Vec4::W;

        backend.set_shader_program(program);
        backend.set_shader_uniform(
            program,
            PROJECTION_UNIFORM,
            &UniformValue::Mat4(camera.projection()),
        );
        backend.set_shader_uniform(program, VIEW_UNIFORM, &UniformValue::Mat4(view));
        backend.set_vertex_buffer(self.buffer.id()?);
        backend.set_vertex_layout(self.layout.id()?);
        backend.set_cubemap(self.cubemap.id()?);
        backend.set_sampler_state(self.sampler.id()?);
        backend.set_blend_state(false);
        backend.set_depth_state(false, false);
        backend.set_rasterizer_state(CullMode::None, FrontFace::Ccw);
        backend.draw(PrimitiveTopology::TriangleList, 0, self.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::{Command, RecordingBackend};
    use glam::{Mat4, Vec3};

    const VS: &str = "#version 450
layout(set = 0, binding = 0) uniform Uniforms { mat4 u_projection; mat4 u_view; };
void main() {}
";
    const FS: &str = "#version 450
layout(set = 1, binding = 0) uniform textureCube u_texture;
layout(set = 1, binding = 1) uniform sampler u_sampler;
void main() {}
";

    fn skybox_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("shader.vs.glsl"), VS).unwrap();
        std::fs::write(dir.path().join("shader.fs.glsl"), FS).unwrap();
        for name in SKYBOX_FACES {
            image::RgbImage::from_pixel(4, 4, image::Rgb([0, 0, 40]))
                .save(dir.path().join(name))
                .unwrap();
        }
        dir
    }

    #[test]
    fn creates_and_draws_without_translation() {
        let dir = skybox_dir();
        let mut backend = RecordingBackend::new();
        let mut skybox = Skybox::new();
        skybox.create(&mut backend, dir.path()).unwrap();
        assert!(skybox.is_valid());

        let mut camera = Camera::new(Mat4::IDENTITY);
        camera.set_position(Vec3::new(10.0, 20.0, 30.0));
        camera.rotate_y(0.5);
        camera.update();
        backend.clear_commands();
        skybox.draw(&mut backend, &camera).unwrap();

        let program = skybox.program.id().unwrap();
        let Some(UniformValue::Mat4(view)) = backend.uniform(program, VIEW_UNIFORM) else {
            panic!("view uniform not set");
        };
        assert_eq!(view.w_axis, Vec4::W);
        assert_eq!(view.x_axis, camera.view().x_axis);
        assert!(backend.commands().contains(&Command::SetDepthState {
            test: false,
            write: false
        }));
        assert_eq!(
            backend.commands().last(),
            Some(&Command::Draw {
                topology: PrimitiveTopology::TriangleList,
                first: 0,
                count: 36
            })
        );
    }

    #[test]
    fn missing_face_releases_everything() {
        let dir = skybox_dir();
        std::fs::remove_file(dir.path().join("zneg.jpg")).unwrap();

        let mut backend = RecordingBackend::new();
        let mut skybox = Skybox::new();
        assert!(skybox.create(&mut backend, dir.path()).is_err());
        assert!(!skybox.is_valid());
        assert_eq!(backend.live_resources(), 0);
    }

    #[test]
    fn buffer_failure_releases_everything() {
        let dir = skybox_dir();
        let mut backend = RecordingBackend::new();
        backend.fail_next(ResourceKind::Buffer);
        let mut skybox = Skybox::new();
        assert!(skybox.create(&mut backend, dir.path()).is_err());
        assert_eq!(backend.live_resources(), 0);

        skybox.create(&mut backend, dir.path()).unwrap();
        assert!(skybox.is_valid());
    }

    #[test]
    fn draw_before_create_fails() {
        let mut backend = RecordingBackend::new();
        let skybox = Skybox::new();
        let camera = Camera::new(Mat4::IDENTITY);
        assert!(skybox.draw(&mut backend, &camera).is_err());
        assert!(backend.commands().is_empty());
    }
}
