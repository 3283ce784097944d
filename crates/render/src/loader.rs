//! File-backed resource creation: reads assets and hands them to the wrappers.

use crate::RenderBackend;
use crate::RenderError;
use crate::resource::{Cubemap, ShaderProgram, Texture};
use orrery_assets::{ImageData, load_cubemap_faces, read_shader_sources};
use std::path::Path;

pub fn create_shader_program_from_files(
    backend: &mut dyn RenderBackend,
    program: &mut ShaderProgram,
    vertex: &Path,
    fragment: &Path,
) -> Result<(), RenderError> {
    let sources = read_shader_sources(vertex, fragment)?;
    program
        .create(backend, &sources.vertex, &sources.fragment)
        .inspect_err(|err| {
            tracing::error!(
                vertex = %vertex.display(),
                fragment = %fragment.display(),
                %err,
                "shader program failed"
            );
        })
}

pub fn create_texture_from_file(
    backend: &mut dyn RenderBackend,
    texture: &mut Texture,
    path: &Path,
) -> Result<(), RenderError> {
    let image = ImageData::load(path)?;
    texture.create(
        backend,
        image.format.into(),
        image.width,
        image.height,
        &image.data,
    )
}

/// `paths` in +X, -X, +Y, -Y, +Z, -Z order.
pub fn create_cubemap_from_files(
    backend: &mut dyn RenderBackend,
    cubemap: &mut Cubemap,
    paths: [&Path; 6],
) -> Result<(), RenderError> {
    let faces = load_cubemap_faces(paths)?;
    let first = &faces[0];
    cubemap.create(
        backend,
        first.format.into(),
        first.width,
        first.height,
        faces.each_ref().map(|face| face.data.as_slice()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::RecordingBackend;
    use orrery_assets::SKYBOX_FACES;

    #[test]
    fn texture_from_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("earth.png");
        image::RgbImage::from_pixel(4, 2, image::Rgb([10, 20, 30]))
            .save(&path)
            .unwrap();

        let mut backend = RecordingBackend::new();
        let mut texture = Texture::new();
        create_texture_from_file(&mut backend, &mut texture, &path).unwrap();
        assert!(texture.is_valid());
        assert_eq!(texture.size(), (4, 2));
    }

    #[test]
    fn missing_texture_leaves_wrapper_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let mut backend = RecordingBackend::new();
        let mut texture = Texture::new();
        let err = create_texture_from_file(&mut backend, &mut texture, &dir.path().join("no.png"))
            .unwrap_err();
        assert!(matches!(err, RenderError::Asset(_)));
        assert!(!texture.is_valid());
    }

    #[test]
    fn cubemap_from_faces() {
        let dir = tempfile::tempdir().unwrap();
        for name in SKYBOX_FACES {
            image::RgbImage::from_pixel(2, 2, image::Rgb([1, 2, 3]))
                .save(dir.path().join(name))
                .unwrap();
        }
        let paths = SKYBOX_FACES.map(|name| dir.path().join(name));

        let mut backend = RecordingBackend::new();
        let mut cubemap = Cubemap::new();
        create_cubemap_from_files(&mut backend, &mut cubemap, paths.each_ref().map(|p| p.as_path()))
            .unwrap();
        assert!(cubemap.is_valid());
    }

    #[test]
    fn shader_program_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let vs = dir.path().join("a.vs.glsl");
        let fs = dir.path().join("a.fs.glsl");
        std::fs::write(&vs, "#version 450\nvoid main() {}\n").unwrap();
        std::fs::write(&fs, "#version 450\nvoid main() {}\n").unwrap();

        let mut backend = RecordingBackend::new();
        let mut program = ShaderProgram::new();
        create_shader_program_from_files(&mut backend, &mut program, &vs, &fs).unwrap();
        assert!(program.is_valid());

        let mut missing = ShaderProgram::new();
        assert!(
            create_shader_program_from_files(
                &mut backend,
                &mut missing,
                &vs,
                &dir.path().join("b.fs.glsl")
            )
            .is_err()
        );
        assert!(!missing.is_valid());
    }
}
