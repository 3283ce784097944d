//! Uniform values and their std140 encoding.

use glam::{Mat4, Vec2, Vec3, Vec4};

/// Type of a uniform block member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniformType {
    Float,
    Vec2,
    Vec3,
    Vec4,
    Mat4,
}

impl UniformType {
    /// GLSL spelling, as accepted by the reflection parser.
    pub fn from_glsl(name: &str) -> Option<Self> {
        Some(match name {
            "float" => Self::Float,
            "vec2" => Self::Vec2,
            "vec3" => Self::Vec3,
            "vec4" => Self::Vec4,
            "mat4" => Self::Mat4,
            _ => return None,
        })
    }

    /// Byte size in a std140 block.
    pub fn size(self) -> u32 {
        match self {
            Self::Float => 4,
            Self::Vec2 => 8,
            Self::Vec3 => 12,
            Self::Vec4 => 16,
            Self::Mat4 => 64,
        }
    }

    /// Base alignment in a std140 block.
    pub fn align(self) -> u32 {
        match self {
            Self::Float => 4,
            Self::Vec2 => 8,
            Self::Vec3 | Self::Vec4 | Self::Mat4 => 16,
        }
    }
}

/// A tagged uniform value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Mat4(Mat4),
}

impl UniformValue {
    pub fn ty(&self) -> UniformType {
        match self {
            Self::Float(_) => UniformType::Float,
            Self::Vec2(_) => UniformType::Vec2,
            Self::Vec3(_) => UniformType::Vec3,
            Self::Vec4(_) => UniformType::Vec4,
            Self::Mat4(_) => UniformType::Mat4,
        }
    }

    /// Writes the value's std140 bytes to the start of `dst`.
    ///
    /// `dst` must hold at least `self.ty().size()` bytes.
    pub fn write_std140(&self, dst: &mut [u8]) {
        let size = self.ty().size() as usize;
        let dst = &mut dst[..size];
        match self {
            Self::Float(v) => dst.copy_from_slice(bytemuck::bytes_of(v)),
            Self::Vec2(v) => dst.copy_from_slice(bytemuck::cast_slice(&v.to_array())),
            Self::Vec3(v) => dst.copy_from_slice(bytemuck::cast_slice(&v.to_array())),
            Self::Vec4(v) => dst.copy_from_slice(bytemuck::cast_slice(&v.to_array())),
            Self::Mat4(m) => dst.copy_from_slice(bytemuck::cast_slice(&m.to_cols_array())),
        }
    }
}

impl From<f32> for UniformValue {
    fn from(v: f32) -> Self {
        Self::Float(v)
    }
}

impl From<Vec2> for UniformValue {
    fn from(v: Vec2) -> Self {
        Self::Vec2(v)
    }
}

impl From<Vec3> for UniformValue {
    fn from(v: Vec3) -> Self {
        Self::Vec3(v)
    }
}

impl From<Vec4> for UniformValue {
    fn from(v: Vec4) -> Self {
        Self::Vec4(v)
    }
}

impl From<Mat4> for UniformValue {
    fn from(v: Mat4) -> Self {
        Self::Mat4(v)
    }
}

pub(crate) fn align_up(value: u32, align: u32) -> u32 {
    value.div_ceil(align) * align
}
