use crate::types::{AttributeFormat, VertexAttribute};
use bytemuck::{Pod, Zeroable};

/// Position + texcoord vertex used by meshes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex3d {
    pub position: [f32; 3],
    pub texcoord: [f32; 2],
}

impl Vertex3d {
    pub const fn new(x: f32, y: f32, z: f32, u: f32, v: f32) -> Self {
        Self {
            position: [x, y, z],
            texcoord: [u, v],
        }
    }

    pub const ATTRIBUTES: [VertexAttribute; 2] = [
        VertexAttribute {
            location: 0,
            format: AttributeFormat::Float,
            count: 3,
            normalized: false,
        },
        VertexAttribute {
            location: 1,
            format: AttributeFormat::Float,
            count: 2,
            normalized: false,
        },
    ];
}

/// Screen-space position + texcoord vertex used by the composite quad and text.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex2d {
    pub position: [f32; 2],
    pub texcoord: [f32; 2],
}

impl Vertex2d {
    pub const fn new(x: f32, y: f32, u: f32, v: f32) -> Self {
        Self {
            position: [x, y],
            texcoord: [u, v],
        }
    }

    pub const ATTRIBUTES: [VertexAttribute; 2] = [
        VertexAttribute {
            location: 0,
            format: AttributeFormat::Float,
            count: 2,
            normalized: false,
        },
        VertexAttribute {
            location: 1,
            format: AttributeFormat::Float,
            count: 2,
            normalized: false,
        },
    ];
}
