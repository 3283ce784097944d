use crate::RenderBackend;
use crate::RenderError;
use crate::material::Material;
use crate::resource::VertexBuffer;
use crate::types::{BufferUsage, CullMode, FrontFace, LayoutId, PrimitiveTopology, ResourceKind};
use crate::vertex::Vertex3d;
use glam::Mat4;
use std::path::Path;

/// Name of the model-matrix uniform every mesh publishes.
pub const WORLD_UNIFORM: &str = "u_world";

/// Geometry plus its material and model transform.
///
/// The vertex layout is shared and owned elsewhere. Every draw uses opaque,
/// depth-tested, back-face-culled state with clockwise front faces.
#[derive(Debug)]
pub struct Mesh {
    pub material: Material,
    buffer: VertexBuffer,
    layout: LayoutId,
    topology: PrimitiveTopology,
    count: u32,
    transform: Mat4,
}

impl Mesh {
    pub fn new(layout: LayoutId) -> Self {
        Self {
            material: Material::default(),
            buffer: VertexBuffer::new(),
            layout,
            topology: PrimitiveTopology::TriangleList,
            count: 0,
            transform: Mat4::IDENTITY,
        }
    }

    /// Uploads `count` vertices of `stride` bytes each.
    pub fn create(
        &mut self,
        backend: &mut dyn RenderBackend,
        topology: PrimitiveTopology,
        stride: u32,
        count: u32,
        data: &[u8],
    ) -> Result<(), RenderError> {
        let expected = stride as usize * count as usize;
        if data.len() != expected {
            return Err(RenderError::creation(
                ResourceKind::Buffer,
                format!("mesh data is {} bytes, expected {expected}", data.len()),
            ));
        }
        self.buffer.create(backend, BufferUsage::Static, data)?;
        self.topology = topology;
        self.count = count;
        Ok(())
    }

    /// Loads a Wavefront OBJ file as a triangle list of [`Vertex3d`].
    pub fn create_from_obj(
        &mut self,
        backend: &mut dyn RenderBackend,
        path: &Path,
    ) -> Result<(), RenderError> {
        let vertices: Vec<Vertex3d> = orrery_assets::load_obj(path)?
            .into_iter()
            .map(|v| Vertex3d {
                position: v.position,
                texcoord: v.texcoord,
            })
            .collect();
        let count = u32::try_from(vertices.len()).map_err(|_| {
            RenderError::creation(ResourceKind::Buffer, "model has too many vertices")
        })?;
        self.create(
            backend,
            PrimitiveTopology::TriangleList,
            std::mem::size_of::<Vertex3d>() as u32,
            count,
            bytemuck::cast_slice(&vertices),
        )
    }

    /// Replaces the geometry, keeping the topology.
    pub fn update(
        &mut self,
        backend: &mut dyn RenderBackend,
        stride: u32,
        count: u32,
        data: &[u8],
    ) -> Result<(), RenderError> {
        let expected = stride as usize * count as usize;
        if data.len() != expected {
            return Err(RenderError::creation(
                ResourceKind::Buffer,
                format!("mesh data is {} bytes, expected {expected}", data.len()),
            ));
        }
        self.buffer.update(backend, data)?;
        self.count = count;
        Ok(())
    }

    pub fn destroy(&mut self, backend: &mut dyn RenderBackend) {
        self.buffer.destroy(backend);
        self.count = 0;
    }

    pub fn is_valid(&self) -> bool {
        self.buffer.is_valid()
    }

    pub fn vertex_count(&self) -> u32 {
        self.count
    }

    /// Stores the model matrix and republishes it as the material's world
    /// uniform.
    pub fn set_transform(&mut self, transform: Mat4) {
        self.transform = transform;
        self.material.set_parameter(WORLD_UNIFORM, transform);
    }

    pub fn transform(&self) -> Mat4 {
        self.transform
    }

    pub fn draw(&self, backend: &mut dyn RenderBackend) -> Result<(), RenderError> {
        self.material.bind(backend)?;
        backend.set_vertex_buffer(self.buffer.id()?);
        backend.set_vertex_layout(self.layout);
        backend.set_blend_state(false);
        backend.set_depth_state(true, true);
        backend.set_rasterizer_state(CullMode::Back, FrontFace::Cw);
        backend.draw(self.topology, 0, self.count)
    }
}
