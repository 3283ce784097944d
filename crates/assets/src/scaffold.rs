//! Placeholder data directory generation.

use crate::{AssetError, SKYBOX_FACES};
use image::{Rgb, RgbImage, Rgba, RgbaImage};
use std::path::Path;

/// File name of the 16×16 glyph atlas of 8×8 cells.
pub const FONT_ATLAS: &str = "font8x8.png";

const SHADERS: [(&str, &str); 8] = [
    ("world.vs.glsl", include_str!("../../../data/world.vs.glsl")),
    ("world.fs.glsl", include_str!("../../../data/world.fs.glsl")),
    ("final.vs.glsl", include_str!("../../../data/final.vs.glsl")),
    ("final.fs.glsl", include_str!("../../../data/final.fs.glsl")),
    ("font.vs.glsl", include_str!("../../../data/font.vs.glsl")),
    ("font.fs.glsl", include_str!("../../../data/font.fs.glsl")),
    ("skybox/shader.vs.glsl", include_str!("../../../data/skybox/shader.vs.glsl")),
    ("skybox/shader.fs.glsl", include_str!("../../../data/skybox/shader.fs.glsl")),
];

const TEXTURE_SIZE: u32 = 64;
const FACE_SIZE: u32 = 128;

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> AssetError + '_ {
    move |source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn encode_error(path: &Path) -> impl FnOnce(image::ImageError) -> AssetError + '_ {
    move |source| AssetError::Encode {
        path: path.to_path_buf(),
        source,
    }
}

fn body_color(name: &str) -> [u8; 3] {
    match name.trim_end_matches(".png") {
        "sun" => [255, 200, 40],
        "mercury" => [150, 140, 130],
        "venus" => [220, 180, 120],
        "earth" => [50, 110, 220],
        "moon" => [190, 190, 190],
        "mars" => [200, 80, 40],
        "jupiter" => [210, 160, 110],
        "saturn" => [230, 210, 150],
        "uranus" => [140, 210, 230],
        "neptune" => [60, 90, 210],
        _ => [200, 0, 200],
    }
}

/// Two-tone checker so rotation stays visible on a flat colour.
fn body_texture(name: &str) -> RgbImage {
    let [r, g, b] = body_color(name);
    let dark = Rgb([r / 2, g / 2, b / 2]);
    RgbImage::from_fn(TEXTURE_SIZE, TEXTURE_SIZE, |x, y| {
        if ((x / 16) + (y / 16)) % 2 == 0 {
            Rgb([r, g, b])
        } else {
            dark
        }
    })
}

/// Vertical gradient with a sparse, deterministic star field.
fn skybox_face(face: usize) -> RgbImage {
    let mut seed = 0x9e37_79b9_u32.wrapping_mul(face as u32 + 1);
    let mut img = RgbImage::from_fn(FACE_SIZE, FACE_SIZE, |_, y| {
        let t = y as f32 / FACE_SIZE as f32;
        Rgb([(4.0 + 8.0 * t) as u8, (6.0 + 10.0 * t) as u8, (20.0 + 30.0 * t) as u8])
    });
    for _ in 0..48 {
        // xorshift
        seed ^= seed << 13;
        seed ^= seed >> 17;
        seed ^= seed << 5;
        let (x, y) = (seed % FACE_SIZE, (seed / FACE_SIZE) % FACE_SIZE);
        img.put_pixel(x, y, Rgb([255, 255, 240]));
    }
    img
}

/// Glyph atlas: every printable cell gets an outlined box with the glyph's
/// code in binary across its middle rows. Non-printable cells stay empty.
fn font_atlas() -> RgbaImage {
    let mut img = RgbaImage::from_pixel(128, 128, Rgba([0, 0, 0, 0]));
    let white = Rgba([255, 255, 255, 255]);
    for code in u32::from(b'!')..=u32::from(b'~') {
        let (cx, cy) = ((code % 16) * 8, (code / 16) * 8);
        for i in 1..7 {
            img.put_pixel(cx + i, cy + 1, white);
            img.put_pixel(cx + i, cy + 6, white);
            img.put_pixel(cx + 1, cy + i, white);
            img.put_pixel(cx + 6, cy + i, white);
        }
        for bit in 0..4 {
            if code & (1 << bit) != 0 {
                img.put_pixel(cx + 2 + bit, cy + 3, white);
            }
            if code & (1 << (bit + 4)) != 0 {
                img.put_pixel(cx + 2 + bit, cy + 4, white);
            }
        }
    }
    img
}

/// Writes a complete data directory: shaders, the font atlas, one texture per
/// entry of `textures` and the skybox. Existing files are overwritten.
pub fn scaffold_data_dir(dir: &Path, textures: &[String]) -> Result<(), AssetError> {
    let skybox = dir.join("skybox");
    std::fs::create_dir_all(&skybox).map_err(io_error(&skybox))?;

    for (name, source) in SHADERS {
        let path = dir.join(name);
        std::fs::write(&path, source).map_err(io_error(&path))?;
    }

    let path = dir.join(FONT_ATLAS);
    font_atlas().save(&path).map_err(encode_error(&path))?;

    for texture in textures {
        let path = dir.join(texture);
        body_texture(texture).save(&path).map_err(encode_error(&path))?;
    }

    for (i, face) in SKYBOX_FACES.iter().enumerate() {
        let path = skybox.join(face);
        skybox_face(i).save(&path).map_err(encode_error(&path))?;
    }

    tracing::info!(dir = %dir.display(), textures = textures.len(), "scaffolded data directory");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ImageData, PixelFormat, load_cubemap_faces, read_shader_sources};

    #[test]
    fn scaffold_produces_loadable_directory() {
        let dir = tempfile::tempdir().unwrap();
        let textures = vec!["sun.png".to_string(), "earth.png".to_string()];
        scaffold_data_dir(dir.path(), &textures).unwrap();

        for stem in ["world", "final", "font"] {
            let vs = dir.path().join(format!("{stem}.vs.glsl"));
            let fs = dir.path().join(format!("{stem}.fs.glsl"));
            let sources = read_shader_sources(&vs, &fs).unwrap();
            assert!(sources.vertex.contains("void main"));
        }

        let font = ImageData::load(&dir.path().join(FONT_ATLAS)).unwrap();
        assert_eq!((font.width, font.height, font.format), (128, 128, PixelFormat::Rgba8));

        let sun = ImageData::load(&dir.path().join("sun.png")).unwrap();
        assert_eq!(sun.format, PixelFormat::Rgb8);

        let faces: Vec<_> = SKYBOX_FACES
            .iter()
            .map(|f| dir.path().join("skybox").join(f))
            .collect();
        let refs: [&Path; 6] = std::array::from_fn(|i| faces[i].as_path());
        let faces = load_cubemap_faces(refs).unwrap();
        assert_eq!(faces[0].width, FACE_SIZE);
    }

    #[test]
    fn space_cell_is_empty_and_letters_are_not() {
        let atlas = font_atlas();
        let space = u32::from(b' ');
        let a = u32::from(b'A');
        let cell_alpha = |code: u32| {
            let (cx, cy) = ((code % 16) * 8, (code / 16) * 8);
            (0..8)
                .flat_map(|y| (0..8).map(move |x| (x, y)))
                .map(|(x, y)| u32::from(atlas.get_pixel(cx + x, cy + y)[3]))
                .sum::<u32>()
        };
        assert_eq!(cell_alpha(space), 0);
        assert!(cell_alpha(a) > 0);
    }

    #[test]
    fn unknown_body_gets_marker_color() {
        assert_eq!(body_color("pluto.png"), [200, 0, 200]);
        assert_eq!(body_color("earth.png"), [50, 110, 220]);
    }
}
