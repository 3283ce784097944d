//! Image decoding via the `image` crate.

use crate::AssetError;
use std::path::Path;

/// Skybox face file names, in cubemap layer order (+X, -X, +Y, -Y, +Z, -Z).
pub const SKYBOX_FACES: [&str; 6] = [
    "xpos.jpg", "xneg.jpg", "ypos.jpg", "yneg.jpg", "zpos.jpg", "zneg.jpg",
];

/// Pixel layout of decoded image data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    Rgb8,
    Rgba8,
}

impl PixelFormat {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Rgb8 => 3,
            Self::Rgba8 => 4,
        }
    }
}

/// Decoded image data ready for upload. Rows are stored top to bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
}

impl ImageData {
    /// Loads an image, keeping its own channel count. Only 3- and 4-channel
    /// images are accepted.
    pub fn load(path: &Path) -> Result<Self, AssetError> {
        let img = image::open(path).map_err(|source| match source {
            image::ImageError::IoError(source) => AssetError::Io {
                path: path.to_path_buf(),
                source,
            },
            source => AssetError::Decode {
                path: path.to_path_buf(),
                source,
            },
        })?;

        let channels = img.color().channel_count();
        let (width, height) = (img.width(), img.height());
        let (data, format) = match channels {
            3 => (img.to_rgb8().into_raw(), PixelFormat::Rgb8),
            4 => (img.to_rgba8().into_raw(), PixelFormat::Rgba8),
            _ => {
                return Err(AssetError::UnsupportedChannels {
                    path: path.to_path_buf(),
                    channels,
                });
            }
        };

        tracing::debug!(path = %path.display(), width, height, ?format, "loaded image");
        Ok(Self {
            data,
            width,
            height,
            format,
        })
    }

    /// A single-colour RGBA image.
    pub fn solid(width: u32, height: u32, color: [u8; 4]) -> Self {
        let data = color.repeat((width * height) as usize);
        Self {
            data,
            width,
            height,
            format: PixelFormat::Rgba8,
        }
    }

    fn describe(&self) -> String {
        format!("{}x{} {:?}", self.width, self.height, self.format)
    }
}

/// Loads six cubemap faces. All faces must share size and pixel format.
pub fn load_cubemap_faces(paths: [&Path; 6]) -> Result<[ImageData; 6], AssetError> {
    let [a, b, c, d, e, f] = paths.map(ImageData::load);
    let faces = [a?, b?, c?, d?, e?, f?];

    let first = &faces[0];
    for (path, face) in paths.iter().zip(&faces).skip(1) {
        if (first.width, first.height, first.format) != (face.width, face.height, face.format) {
            return Err(AssetError::MismatchedFace {
                path: path.to_path_buf(),
                expected: first.describe(),
                found: face.describe(),
            });
        }
    }
    Ok(faces)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage, Rgba, RgbaImage};

    #[test]
    fn rgb_png_stays_rgb() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rgb.png");
        RgbImage::from_pixel(4, 2, Rgb([1, 2, 3])).save(&path).unwrap();

        let img = ImageData::load(&path).unwrap();
        assert_eq!(img.format, PixelFormat::Rgb8);
        assert_eq!((img.width, img.height), (4, 2));
        assert_eq!(img.data.len(), 4 * 2 * 3);
        assert_eq!(&img.data[..3], &[1, 2, 3]);
    }

    #[test]
    fn rgba_png_stays_rgba() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rgba.png");
        RgbaImage::from_pixel(3, 3, Rgba([9, 8, 7, 6])).save(&path).unwrap();

        let img = ImageData::load(&path).unwrap();
        assert_eq!(img.format, PixelFormat::Rgba8);
        assert_eq!(&img.data[..4], &[9, 8, 7, 6]);
    }

    #[test]
    fn grayscale_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gray.png");
        GrayImage::from_pixel(2, 2, Luma([128])).save(&path).unwrap();

        assert!(matches!(
            ImageData::load(&path),
            Err(AssetError::UnsupportedChannels { channels: 1, .. })
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            ImageData::load(&dir.path().join("nope.png")),
            Err(AssetError::Io { .. })
        ));
    }

    #[test]
    fn cubemap_faces_must_match() {
        let dir = tempfile::tempdir().unwrap();
        let paths: Vec<_> = SKYBOX_FACES.iter().map(|f| dir.path().join(f)).collect();
        for (i, path) in paths.iter().enumerate() {
            let size = if i == 4 { 16 } else { 8 };
            RgbImage::from_pixel(size, size, Rgb([10, 20, 30])).save(path).unwrap();
        }
        let refs: [&Path; 6] = std::array::from_fn(|i| paths[i].as_path());

        match load_cubemap_faces(refs) {
            Err(AssetError::MismatchedFace { path, .. }) => assert!(path.ends_with("zpos.jpg")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn cubemap_faces_load_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let paths: Vec<_> = SKYBOX_FACES.iter().map(|f| dir.path().join(f)).collect();
        for path in &paths {
            RgbImage::from_pixel(8, 8, Rgb([200, 200, 200])).save(path).unwrap();
        }
        let refs: [&Path; 6] = std::array::from_fn(|i| paths[i].as_path());

        let faces = load_cubemap_faces(refs).unwrap();
        assert!(faces.iter().all(|f| f.format == PixelFormat::Rgb8 && f.width == 8));
    }

    #[test]
    fn solid_fills_every_pixel() {
        let img = ImageData::solid(2, 3, [1, 2, 3, 4]);
        assert_eq!(img.data.len(), 24);
        assert!(img.data.chunks(4).all(|p| p == [1, 2, 3, 4]));
    }
}
