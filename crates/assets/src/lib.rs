//! Asset loading: shader sources, decoded images and cubemap face sets.
//!
//! The renderer never touches file formats; it receives decoded pixels and
//! shader text from here.
//!
//! # Layout
//! A data directory holds `world`, `final` and `font` shader pairs, the font
//! atlas, one texture per body and a `skybox/` directory with its own shader
//! pair and six faces. [`scaffold_data_dir`] writes a complete placeholder
//! directory.

mod obj;
mod pixels;
mod scaffold;
mod shader;

pub use obj::{ModelVertex, load_obj, parse_obj};
pub use pixels::{ImageData, PixelFormat, SKYBOX_FACES, load_cubemap_faces};
pub use scaffold::{FONT_ATLAS, scaffold_data_dir};
pub use shader::{ShaderSources, read_shader_sources};

use std::path::PathBuf;

/// Errors from asset operations.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("could not encode {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("{path} has {channels} channels, expected 3 or 4")]
    UnsupportedChannels { path: PathBuf, channels: u8 },
    #[error("{path}:{line}: {message}")]
    Obj {
        path: PathBuf,
        line: usize,
        message: String,
    },
    #[error("cubemap face {path} is {found}, expected {expected}")]
    MismatchedFace {
        path: PathBuf,
        expected: String,
        found: String,
    },
}

pub fn crate_info() -> &'static str {
    "orrery-assets v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("assets"));
    }

    #[test]
    fn errors_name_the_file() {
        let err = AssetError::UnsupportedChannels {
            path: PathBuf::from("data/gray.png"),
            channels: 1,
        };
        assert_eq!(
            err.to_string(),
            "data/gray.png has 1 channels, expected 3 or 4"
        );
    }
}
