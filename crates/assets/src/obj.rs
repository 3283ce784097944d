//! Wavefront OBJ reader producing flat position + texcoord triangle lists.

use crate::AssetError;
use std::path::Path;

/// One unindexed model vertex: position followed by texcoord.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelVertex {
    pub position: [f32; 3],
    pub texcoord: [f32; 2],
}

/// Reads an OBJ file. See [`parse_obj`].
pub fn load_obj(path: &Path) -> Result<Vec<ModelVertex>, AssetError> {
    let text = std::fs::read_to_string(path).map_err(|source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let vertices = parse_obj(&text, path)?;
    tracing::debug!(path = %path.display(), vertices = vertices.len(), "loaded model");
    Ok(vertices)
}

/// Parses OBJ text into a triangle list.
///
/// Polygons are fan-triangulated. Texture rows are flipped (`v' = 1 - v`) and
/// triangle winding is reversed to match the renderer's clockwise front faces.
/// Normals, groups and materials are ignored. `origin` is only used in errors.
pub fn parse_obj(text: &str, origin: &Path) -> Result<Vec<ModelVertex>, AssetError> {
    let mut positions: Vec<[f32; 3]> = Vec::new();
    let mut texcoords: Vec<[f32; 2]> = Vec::new();
    let mut vertices = Vec::new();

    for (number, line) in text.lines().enumerate() {
        let line_no = number + 1;
        let fail = |message: String| AssetError::Obj {
            path: origin.to_path_buf(),
            line: line_no,
            message,
        };
        let mut parts = line.split_whitespace();

        match parts.next() {
            Some("v") => {
                let v = parse_floats::<3>(&mut parts).map_err(fail)?;
                positions.push(v);
            }
            Some("vt") => {
                let [u, v] = parse_floats::<2>(&mut parts).map_err(fail)?;
                texcoords.push([u, 1.0 - v]);
            }
            Some("f") => {
                let mut corners = Vec::with_capacity(4);
                for corner in parts {
                    corners.push(
                        resolve_corner(corner, &positions, &texcoords).map_err(&fail)?,
                    );
                }
                if corners.len() < 3 {
                    return Err(fail(format!("face has {} corners", corners.len())));
                }
                for i in 1..corners.len() - 1 {
                    vertices.push(corners[0]);
                    vertices.push(corners[i + 1]);
                    vertices.push(corners[i]);
                }
            }
            _ => {}
        }
    }

    Ok(vertices)
}

fn parse_floats<'a, const N: usize>(
    parts: &mut impl Iterator<Item = &'a str>,
) -> Result<[f32; N], String> {
    let mut out = [0.0; N];
    for slot in &mut out {
        let token = parts.next().ok_or("too few components")?;
        *slot = token
            .parse()
            .map_err(|_| format!("invalid number {token:?}"))?;
    }
    Ok(out)
}

/// Resolves `p`, `p/t`, `p//n` or `p/t/n`, 1-based or negative-relative.
fn resolve_corner(
    corner: &str,
    positions: &[[f32; 3]],
    texcoords: &[[f32; 2]],
) -> Result<ModelVertex, String> {
    let mut indices = corner.split('/');
    let position = indices
        .next()
        .ok_or_else(|| format!("empty face corner {corner:?}"))
        .and_then(|i| lookup(i, positions))?;
    let texcoord = match indices.next() {
        Some(i) if !i.is_empty() => lookup(i, texcoords)?,
        _ => [0.0, 0.0],
    };
    Ok(ModelVertex { position, texcoord })
}

fn lookup<T: Copy>(token: &str, items: &[T]) -> Result<T, String> {
    let index: i64 = token
        .parse()
        .map_err(|_| format!("invalid index {token:?}"))?;
    let resolved = match index {
        i if i > 0 => usize::try_from(i - 1).ok(),
        i if i < 0 => usize::try_from(items.len() as i64 + i).ok(),
        _ => None,
    };
    resolved
        .and_then(|i| items.get(i).copied())
        .ok_or_else(|| format!("index {index} out of range"))
}
