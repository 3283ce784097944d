//! Minimal GLSL reflection: the uniform block layout and the sampled texture
//! kind of a shader pair.
//!
//! Programs declare at most one uniform block of `float`/`vec*`/`mat4`
//! members plus at most one sampled texture (`texture2D` or `textureCube`).
//! Uniforms are addressed by member name; the block name itself is free.

use crate::RenderError;
use crate::uniform::{UniformType, UniformValue, align_up};

/// Kind of texture a program samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureKind {
    D2,
    Cube,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformField {
    pub name: String,
    pub ty: UniformType,
    pub offset: u32,
}

/// std140 layout of a program's uniform block.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UniformBlock {
    pub fields: Vec<UniformField>,
    /// Total size, rounded up to 16 bytes.
    pub size: u32,
}

impl UniformBlock {
    fn from_members(members: Vec<(UniformType, String)>) -> Self {
        let mut offset = 0;
        let mut fields = Vec::with_capacity(members.len());
        for (ty, name) in members {
            let start = align_up(offset, ty.align());
            fields.push(UniformField {
                name,
                ty,
                offset: start,
            });
            offset = start + ty.size();
        }
        Self {
            fields,
            size: align_up(offset, 16),
        }
    }

    pub fn field(&self, name: &str) -> Option<&UniformField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Writes `value` into `data` if `name` is a member of matching type.
    /// Returns whether anything was written.
    pub fn write(&self, data: &mut [u8], name: &str, value: &UniformValue) -> bool {
        match self.field(name) {
            Some(field) if field.ty == value.ty() => {
                let start = field.offset as usize;
                match data.get_mut(start..start + field.ty.size() as usize) {
                    Some(dst) => {
                        value.write_std140(dst);
                        true
                    }
                    None => false,
                }
            }
            Some(field) => {
                tracing::warn!(name, expected = ?field.ty, found = ?value.ty(), "uniform type mismatch");
                false
            }
            None => false,
        }
    }
}

/// What a shader (or a linked program) exposes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ShaderReflection {
    pub block: Option<UniformBlock>,
    pub texture: Option<TextureKind>,
}

impl ShaderReflection {
    /// Reflects one shader stage.
    pub fn parse(source: &str) -> Result<Self, RenderError> {
        let stripped = strip_comments(source);
        let tokens = tokenize(&stripped);
        let mut reflection = Self::default();
        let mut i = 0;

        while i < tokens.len() {
            if tokens[i] != "uniform" {
                i += 1;
                continue;
            }
            let ty = tokens.get(i + 1).copied().unwrap_or_default();
            let after = tokens.get(i + 2).copied().unwrap_or_default();

            if after == "{" {
                let (members, close) = parse_block(&tokens, i + 3)?;
                if reflection.block.is_some() {
                    return Err(RenderError::Reflection(
                        "more than one uniform block".into(),
                    ));
                }
                reflection.block = Some(UniformBlock::from_members(members));
                i = close + 1;
                continue;
            }

            let kind = match ty {
                "texture2D" | "sampler2D" => Some(TextureKind::D2),
                "textureCube" | "samplerCube" => Some(TextureKind::Cube),
                "sampler" => None,
                other => {
                    return Err(RenderError::Reflection(format!(
                        "uniform {after} of type {other} must be declared inside a block"
                    )));
                }
            };
            if let Some(kind) = kind {
                if reflection.texture.is_some_and(|t| t != kind) {
                    return Err(RenderError::Reflection(
                        "program samples more than one texture kind".into(),
                    ));
                }
                reflection.texture = Some(kind);
            }
            i += 2;
        }

        Ok(reflection)
    }

    /// Combines vertex and fragment reflections into a program's reflection.
    /// A block declared in both stages must be declared identically.
    pub fn merge(vertex: Self, fragment: Self) -> Result<Self, RenderError> {
        let block = match (vertex.block, fragment.block) {
            (Some(v), Some(f)) if v != f => {
                return Err(RenderError::Reflection(
                    "uniform block differs between stages".into(),
                ));
            }
            (v, f) => v.or(f),
        };
        let texture = match (vertex.texture, fragment.texture) {
            (Some(v), Some(f)) if v != f => {
                return Err(RenderError::Reflection(
                    "texture kind differs between stages".into(),
                ));
            }
            (v, f) => v.or(f),
        };
        Ok(Self { block, texture })
    }

    /// Reflects and merges a vertex/fragment pair.
    pub fn program(vertex: &str, fragment: &str) -> Result<Self, RenderError> {
        Self::merge(Self::parse(vertex)?, Self::parse(fragment)?)
    }

    pub fn block_size(&self) -> u32 {
        self.block.as_ref().map_or(0, |b| b.size)
    }
}

/// Parses `type name;` members starting at `start`. Returns the members and
/// the index of the closing brace.
fn parse_block(
    tokens: &[&str],
    start: usize,
) -> Result<(Vec<(UniformType, String)>, usize), RenderError> {
    let mut members = Vec::new();
    let mut i = start;
    loop {
        match tokens.get(i).copied() {
            None => return Err(RenderError::Reflection("unterminated uniform block".into())),
            Some("}") => return Ok((members, i)),
            Some(ty_name) => {
                let ty = UniformType::from_glsl(ty_name).ok_or_else(|| {
                    RenderError::Reflection(format!("unsupported uniform type {ty_name}"))
                })?;
                let name = tokens.get(i + 1).copied().unwrap_or_default();
                if tokens.get(i + 2).copied() != Some(";") || !is_identifier(name) {
                    return Err(RenderError::Reflection(format!(
                        "expected `{ty_name} <name>;` in uniform block"
                    )));
                }
                members.push((ty, name.to_string()));
                i += 3;
            }
        }
    }
}

fn is_identifier(token: &str) -> bool {
    token
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
}

/// Removes comments and preprocessor lines.
fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut rest = source;
    while !rest.is_empty() {
        if let Some(tail) = rest.strip_prefix("//") {
            rest = tail.find('\n').map_or("", |n| &tail[n..]);
        } else if let Some(tail) = rest.strip_prefix("/*") {
            rest = tail.find("*/").map_or("", |n| &tail[n + 2..]);
            out.push(' ');
        } else {
            let mut chars = rest.chars();
            if let Some(c) = chars.next() {
                out.push(c);
            }
            rest = chars.as_str();
        }
    }

    out.lines()
        .filter(|line| !line.trim_start().starts_with('#'))
        .collect::<Vec<_>>()
        .join("\n")
}

fn tokenize(source: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = None;
    for (i, c) in source.char_indices() {
        let word = c.is_ascii_alphanumeric() || c == '_';
        match (word, start) {
            (true, None) => start = Some(i),
            (true, Some(_)) => {}
            (false, Some(s)) => {
                tokens.push(&source[s..i]);
                start = None;
            }
            (false, None) => {}
        }
        if !word && !c.is_whitespace() {
            tokens.push(&source[i..i + c.len_utf8()]);
        }
    }
    if let Some(s) = start {
        tokens.push(&source[s..]);
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Mat4, Vec3};

    const WORLD_VS: &str = r#"
#version 450
layout(location = 0) in vec3 a_position;
// a comment mentioning uniform nothing
layout(set = 0, binding = 0) uniform Uniforms {
    mat4 u_projection;
    mat4 u_view; /* trailing */
    mat4 u_world;
};
void main() {}
"#;

    const WORLD_FS: &str = r#"
#version 450
layout(set = 1, binding = 0) uniform texture2D u_texture;
layout(set = 1, binding = 1) uniform sampler u_sampler;
void main() {}
"#;

    #[test]
    fn world_program_layout() {
        let r = ShaderReflection::program(WORLD_VS, WORLD_FS).unwrap();
        let block = r.block.unwrap();
        assert_eq!(block.size, 192);
        assert_eq!(block.field("u_view").unwrap().offset, 64);
        assert_eq!(block.field("u_world").unwrap().offset, 128);
        assert_eq!(r.texture, Some(TextureKind::D2));
    }

    #[test]
    fn std140_packing() {
        let src = "uniform B { float a; vec3 b; float c; vec2 d; mat4 e; };";
        let block = ShaderReflection::parse(src).unwrap().block.unwrap();
        let offsets: Vec<u32> = block.fields.iter().map(|f| f.offset).collect();
        assert_eq!(offsets, vec![0, 16, 28, 32, 48]);
        assert_eq!(block.size, 112);
    }

    #[test]
    fn cube_texture_detected() {
        let src = "layout(set = 1, binding = 0) uniform textureCube u_texture;";
        let r = ShaderReflection::parse(src).unwrap();
        assert_eq!(r.texture, Some(TextureKind::Cube));
        assert!(r.block.is_none());
    }

    #[test]
    fn program_without_uniforms() {
        let r = ShaderReflection::program("void main() {}", WORLD_FS).unwrap();
        assert!(r.block.is_none());
        assert_eq!(r.block_size(), 0);
    }

    #[test]
    fn mismatched_blocks_rejected() {
        let other = "uniform U { mat4 u_projection; };";
        assert!(ShaderReflection::program(WORLD_VS, other).is_err());
        assert!(ShaderReflection::program(WORLD_VS, WORLD_VS).is_ok());
    }

    #[test]
    fn loose_uniforms_rejected() {
        let err = ShaderReflection::parse("uniform mat4 u_world;").unwrap_err();
        assert!(err.to_string().contains("inside a block"));
    }

    #[test]
    fn unsupported_member_type_rejected() {
        assert!(ShaderReflection::parse("uniform U { mat3 m; };").is_err());
        assert!(ShaderReflection::parse("uniform U { mat4 m;").is_err());
    }

    #[test]
    fn write_checks_name_and_type() {
        let block = ShaderReflection::parse(WORLD_VS).unwrap().block.unwrap();
        let mut data = vec![0u8; block.size as usize];
        let m = Mat4::from_translation(Vec3::X);

        assert!(block.write(&mut data, "u_world", &UniformValue::Mat4(m)));
        assert!(!block.write(&mut data, "u_missing", &UniformValue::Mat4(m)));
        assert!(!block.write(&mut data, "u_world", &UniformValue::Float(1.0)));

        let x = f32::from_le_bytes(data[128 + 48..128 + 52].try_into().unwrap());
        assert_eq!(x, 1.0);
    }
}
