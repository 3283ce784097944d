use crate::RenderBackend;
use crate::RenderError;
use crate::camera::PROJECTION_UNIFORM;
use crate::material::Material;
use crate::resource::VertexBuffer;
use crate::types::{
    BufferUsage, CullMode, FrontFace, LayoutId, PrimitiveTopology, ProgramId, ResourceKind,
    SamplerId, TextureId,
};
use crate::uniform::UniformValue;
use crate::vertex::Vertex2d;
use glam::Mat4;
use std::fmt;

/// Longest line `push_line` keeps, in bytes.
pub const MAX_LINE_LEN: usize = 1023;

const ATLAS_COLUMNS: u32 = 16;
const ATLAS_ROWS: u32 = 16;
const GLYPH_WIDTH: f32 = 8.0;
const GLYPH_HEIGHT: f32 = 8.0;
const ROW_ADVANCE: f32 = 10.0;
const TAB_GLYPHS: f32 = 4.0;
const SCALE: f32 = 2.0;
const ORIGIN: (f32, f32) = (2.0, 2.0);

/// Screen-space text drawn from an 8x8 glyph atlas, rebuilt every frame.
///
/// Call [`DebugOverlay::pre_frame`] once per frame before pushing lines.
#[derive(Debug, Default)]
pub struct DebugOverlay {
    material: Material,
    layout: Option<LayoutId>,
    buffer: VertexBuffer,
    lines: Vec<String>,
    vertex_count: u32,
}

impl DebugOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Points the overlay at the font program, atlas, sampler and the shared
    /// 2D vertex layout.
    pub fn setup(
        &mut self,
        program: ProgramId,
        texture: TextureId,
        sampler: SamplerId,
        layout: LayoutId,
    ) {
        self.material.set_shader_program(program);
        self.material.set_texture(texture);
        self.material.set_sampler_state(sampler);
        self.layout = Some(layout);
    }

    /// Appends a formatted line, truncated to [`MAX_LINE_LEN`] bytes.
    pub fn push_line(&mut self, args: fmt::Arguments<'_>) {
        let mut line = fmt::format(args);
        if line.len() > MAX_LINE_LEN {
            let mut end = MAX_LINE_LEN;
            while !line.is_char_boundary(end) {
                end -= 1;
            }
            line.truncate(end);
        }
        self.lines.push(line);
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Drops last frame's lines and sets a pixel projection for the viewport.
    pub fn pre_frame(&mut self, width: u32, height: u32) {
        self.lines.clear();
        let projection = Mat4::orthographic_rh(0.0, width as f32, height as f32, 0.0, -1.0, 1.0);
        self.material.set_parameter(PROJECTION_UNIFORM, projection);
    }

    pub fn projection(&self) -> Option<Mat4> {
        match self.material.parameter(PROJECTION_UNIFORM) {
            Some(UniformValue::Mat4(m)) => Some(*m),
            _ => None,
        }
    }

    /// Vertices produced by the last [`DebugOverlay::draw`].
    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    /// Rebuilds the glyph quads and draws them alpha blended over the frame.
    /// Nothing is drawn when there is no text.
    pub fn draw(&mut self, backend: &mut dyn RenderBackend) -> Result<(), RenderError> {
        let vertices = layout_text(&self.lines);
        self.vertex_count = vertices.len() as u32;
        if vertices.is_empty() {
            return Ok(());
        }

        let bytes: &[u8] = bytemuck::cast_slice(&vertices);
        if self.buffer.is_valid() {
            self.buffer.update(backend, bytes)?;
        } else {
            self.buffer.create(backend, BufferUsage::Dynamic, bytes)?;
        }

        let layout = self
            .layout
            .ok_or(RenderError::NotCreated(ResourceKind::Layout))?;
        self.material.bind(backend)?;
        backend.set_vertex_buffer(self.buffer.id()?);
        backend.set_vertex_layout(layout);
        backend.set_blend_state(true);
        backend.set_depth_state(false, true);
        backend.set_rasterizer_state(CullMode::None, FrontFace::Cw);
        backend.draw(PrimitiveTopology::TriangleList, 0, self.vertex_count)
    }

    pub fn destroy(&mut self, backend: &mut dyn RenderBackend) {
        self.buffer.destroy(backend);
        self.vertex_count = 0;
    }
}

/// Two triangles per printable glyph. Each line starts a new row.
fn layout_text(lines: &[String]) -> Vec<Vertex2d> {
    let capacity = lines.iter().map(|l| l.len() * 6).sum();
    let mut vertices = Vec::with_capacity(capacity);

    let cell_u = 1.0 / ATLAS_COLUMNS as f32;
    let cell_v = 1.0 / ATLAS_ROWS as f32;
    let (left, mut y) = ORIGIN;

    for line in lines {
        let mut x = left;
        for ch in line.chars() {
            match ch {
                '\n' => {
                    x = left;
                    y += ROW_ADVANCE * SCALE;
                    continue;
                }
                '\t' => {
                    x += GLYPH_WIDTH * TAB_GLYPHS;
                    continue;
                }
                _ => {}
            }
            let code = match ch {
                ' '..='~' => ch as u32,
                _ => '?' as u32,
            };

            let (x0, y0) = (x, y);
            let (x1, y1) = (x0 + GLYPH_WIDTH * SCALE, y0 + GLYPH_HEIGHT * SCALE);
            let u0 = (code % ATLAS_COLUMNS) as f32 * cell_u;
            let v0 = (code / ATLAS_COLUMNS) as f32 * cell_v;
            let (u1, v1) = (u0 + cell_u, v0 + cell_v);

            vertices.extend_from_slice(&[
                Vertex2d::new(x0, y0, u0, v0),
                Vertex2d::new(x1, y0, u1, v0),
                Vertex2d::new(x1, y1, u1, v1),
                Vertex2d::new(x1, y1, u1, v1),
                Vertex2d::new(x0, y1, u0, v1),
                Vertex2d::new(x0, y0, u0, v0),
            ]);
            x += GLYPH_WIDTH * SCALE;
        }
        y += ROW_ADVANCE * SCALE;
    }
    vertices
}
