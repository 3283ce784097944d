use orrery_render::RenderError;

pub(crate) const ENTRY_POINT: &str = "main";

/// Parses and validates a GLSL stage with naga so compile errors carry
/// source locations before wgpu ever sees the code.
pub(crate) fn check_glsl(source: &str, stage: naga::ShaderStage) -> Result<(), RenderError> {
    let mut frontend = naga::front::glsl::Frontend::default();
    let module = frontend
        .parse(&naga::front::glsl::Options::from(stage), source)
        .map_err(|errors| RenderError::ShaderCompile(errors.emit_to_string(source)))?;

    naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    )
    .validate(&module)
    .map_err(|err| RenderError::ShaderCompile(err.emit_to_string(source)))?;
    Ok(())
}

pub(crate) fn create_module(
    device: &wgpu::Device,
    label: &str,
    source: &str,
    stage: naga::ShaderStage,
) -> Result<wgpu::ShaderModule, RenderError> {
    check_glsl(source, stage)?;
    let scope = ValidationScope::new(device);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Glsl {
            shader: source.into(),
            stage,
            defines: Default::default(),
        },
    });
    scope
        .end()
        .map_err(|err| RenderError::ShaderCompile(err.to_string()))?;
    Ok(module)
}

/// Captures validation errors raised between `new` and `end`.
#[must_use = "a validation scope must be closed with `end`"]
pub(crate) struct ValidationScope<'a> {
    device: &'a wgpu::Device,
}

impl<'a> ValidationScope<'a> {
    pub(crate) fn new(device: &'a wgpu::Device) -> Self {
        device.push_error_scope(wgpu::ErrorFilter::Validation);
        Self { device }
    }

    pub(crate) fn end(self) -> Result<(), wgpu::Error> {
        match pollster::block_on(self.device.pop_error_scope()) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orrery_render::{ShaderReflection, TextureKind};

    const SHIPPED: [(&str, &str, &str); 4] = [
        (
            "world",
            include_str!("../../../data/world.vs.glsl"),
            include_str!("../../../data/world.fs.glsl"),
        ),
        (
            "final",
            include_str!("../../../data/final.vs.glsl"),
            include_str!("../../../data/final.fs.glsl"),
        ),
        (
            "font",
            include_str!("../../../data/font.vs.glsl"),
            include_str!("../../../data/font.fs.glsl"),
        ),
        (
            "skybox",
            include_str!("../../../data/skybox/shader.vs.glsl"),
            include_str!("../../../data/skybox/shader.fs.glsl"),
        ),
    ];

    #[test]
    fn shipped_shaders_compile() {
        for (name, vs, fs) in SHIPPED {
            check_glsl(vs, naga::ShaderStage::Vertex)
                .unwrap_or_else(|err| panic!("{name} vertex: {err}"));
            check_glsl(fs, naga::ShaderStage::Fragment)
                .unwrap_or_else(|err| panic!("{name} fragment: {err}"));
        }
    }

    #[test]
    fn shipped_shaders_reflect() {
        let kinds: Vec<_> = SHIPPED
            .iter()
            .map(|(_, vs, fs)| ShaderReflection::program(vs, fs).unwrap().texture)
            .collect();
        assert_eq!(
            kinds,
            vec![
                Some(TextureKind::D2),
                Some(TextureKind::D2),
                Some(TextureKind::D2),
                Some(TextureKind::Cube)
            ]
        );
    }

    #[test]
    fn syntax_errors_are_reported() {
        let err = check_glsl("#version 450\nvoid main() { oops }\n", naga::ShaderStage::Fragment)
            .unwrap_err();
        assert!(matches!(err, RenderError::ShaderCompile(_)));
    }
}
