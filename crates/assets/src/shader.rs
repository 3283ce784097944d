use crate::AssetError;
use std::path::Path;

/// Vertex and fragment shader text of one program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSources {
    pub vertex: String,
    pub fragment: String,
}

fn read(path: &Path) -> Result<String, AssetError> {
    std::fs::read_to_string(path).map_err(|source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads a vertex/fragment shader pair from disk.
pub fn read_shader_sources(vertex: &Path, fragment: &Path) -> Result<ShaderSources, AssetError> {
    let sources = ShaderSources {
        vertex: read(vertex)?,
        fragment: read(fragment)?,
    };
    tracing::debug!(
        vertex = %vertex.display(),
        fragment = %fragment.display(),
        "read shader sources"
    );
    Ok(sources)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_both_stages() {
        let dir = tempfile::tempdir().unwrap();
        let vs = dir.path().join("a.vs.glsl");
        let fs = dir.path().join("a.fs.glsl");
        std::fs::write(&vs, "void main() {}").unwrap();
        std::fs::write(&fs, "void main() { }").unwrap();

        let sources = read_shader_sources(&vs, &fs).unwrap();
        assert_eq!(sources.vertex, "void main() {}");
        assert_eq!(sources.fragment, "void main() { }");
    }

    #[test]
    fn missing_fragment_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let vs = dir.path().join("a.vs.glsl");
        std::fs::write(&vs, "void main() {}").unwrap();

        let err = read_shader_sources(&vs, &dir.path().join("missing.fs.glsl")).unwrap_err();
        match err {
            AssetError::Io { path, .. } => assert!(path.ends_with("missing.fs.glsl")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
