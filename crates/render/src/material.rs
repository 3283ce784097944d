use crate::RenderBackend;
use crate::RenderError;
use crate::types::{ProgramId, ResourceKind, SamplerId, TextureId};
use crate::uniform::UniformValue;

/// A named uniform value stored on a material.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub value: UniformValue,
}

/// Shader program, texture and sampler plus the uniform values they need.
///
/// The referenced resources are owned elsewhere; the material only holds
/// handles to them.
#[derive(Debug, Clone, Default)]
pub struct Material {
    program: Option<ProgramId>,
    texture: Option<TextureId>,
    sampler: Option<SamplerId>,
    parameters: Vec<Parameter>,
}

impl Material {
    pub fn new(
        program: Option<ProgramId>,
        texture: Option<TextureId>,
        sampler: Option<SamplerId>,
    ) -> Self {
        Self {
            program,
            texture,
            sampler,
            parameters: Vec::new(),
        }
    }

    pub fn set_shader_program(&mut self, program: ProgramId) {
        self.program = Some(program);
    }

    pub fn set_texture(&mut self, texture: TextureId) {
        self.texture = Some(texture);
    }

    pub fn set_sampler_state(&mut self, sampler: SamplerId) {
        self.sampler = Some(sampler);
    }

    pub fn shader_program(&self) -> Option<ProgramId> {
        self.program
    }

    pub fn texture(&self) -> Option<TextureId> {
        self.texture
    }

    pub fn sampler_state(&self) -> Option<SamplerId> {
        self.sampler
    }

    /// Stores `value` under `name`, overwriting an existing entry.
    ///
    /// Changing the type of an existing parameter is a programming error:
    /// it panics in debug builds and overwrites in release builds.
    pub fn set_parameter(&mut self, name: &str, value: impl Into<UniformValue>) {
        let value = value.into();
        match self.parameters.iter_mut().find(|p| p.name == name) {
            Some(param) => {
                debug_assert_eq!(
                    param.value.ty(),
                    value.ty(),
                    "material parameter {name} changed type"
                );
                param.value = value;
            }
            None => self.parameters.push(Parameter {
                name: name.to_string(),
                value,
            }),
        }
    }

    pub fn parameter(&self, name: &str) -> Option<&UniformValue> {
        self.parameters
            .iter()
            .find(|p| p.name == name)
            .map(|p| &p.value)
    }

    /// Parameters in insertion order.
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Binds the program, uploads every parameter, then binds the texture and
    /// sampler if set.
    pub fn bind(&self, backend: &mut dyn RenderBackend) -> Result<(), RenderError> {
        let program = self
            .program
            .ok_or(RenderError::NotCreated(ResourceKind::Program))?;

        backend.set_shader_program(program);
        for param in &self.parameters {
            backend.set_shader_uniform(program, &param.name, &param.value);
        }
        if let Some(texture) = self.texture {
            backend.set_texture(texture);
        }
        if let Some(sampler) = self.sampler {
            backend.set_sampler_state(sampler);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::{Command, RecordingBackend};
    use glam::{Mat4, Vec2, Vec3, Vec4};

    #[test]
    fn last_write_wins_and_order_is_kept() {
        let mut material = Material::default();
        material.set_parameter("u_a", 1.0_f32);
        material.set_parameter("u_b", Vec3::X);
        material.set_parameter("u_a", 2.0_f32);

        let names: Vec<_> = material.parameters().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["u_a", "u_b"]);
        assert_eq!(material.parameter("u_a"), Some(&UniformValue::Float(2.0)));
        assert!(material.parameter("u_c").is_none());
    }

    #[test]
    fn every_value_kind_is_storable() {
        let mut material = Material::default();
        material.set_parameter("f", 0.5_f32);
        material.set_parameter("v2", Vec2::ONE);
        material.set_parameter("v3", Vec3::ONE);
        material.set_parameter("v4", Vec4::ONE);
        material.set_parameter("m4", Mat4::IDENTITY);
        assert_eq!(material.parameters().len(), 5);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "changed type")]
    fn type_change_panics_in_debug() {
        let mut material = Material::default();
        material.set_parameter("u_world", Mat4::IDENTITY);
        material.set_parameter("u_world", 1.0_f32);
    }

    #[test]
    fn bind_without_program_fails() {
        let mut backend = RecordingBackend::new();
        let material = Material::default();
        assert!(matches!(
            material.bind(&mut backend),
            Err(RenderError::NotCreated(ResourceKind::Program))
        ));
        assert!(backend.commands().is_empty());
    }

    #[test]
    fn bind_issues_program_uniforms_texture_sampler() {
        let mut backend = RecordingBackend::new();
        let program = backend
            .create_shader_program(
                "uniform U { mat4 u_world; float u_time; }; void main() {}",
                "uniform texture2D t; void main() {}",
            )
            .unwrap();
        let texture = backend
            .create_texture(crate::TextureFormat::Rgba8, 1, 1, &[0; 4])
            .unwrap();
        let sampler = backend
            .create_sampler(&crate::SamplerDesc::new(
                crate::FilterMode::Nearest,
                crate::AddressMode::Clamp,
                crate::AddressMode::Clamp,
            ))
            .unwrap();
        backend.clear_commands();

        let mut material = Material::new(Some(program), Some(texture), Some(sampler));
        material.set_parameter("u_world", Mat4::IDENTITY);
        material.set_parameter("u_time", 3.0_f32);
        material.bind(&mut backend).unwrap();

        let commands = backend.commands();
        assert_eq!(commands.len(), 5);
        assert_eq!(commands[0], Command::SetShaderProgram(program));
        assert!(matches!(&commands[1], Command::SetShaderUniform { name, .. } if name == "u_world"));
        assert!(matches!(&commands[2], Command::SetShaderUniform { name, .. } if name == "u_time"));
        assert_eq!(commands[3], Command::SetTexture(texture));
        assert_eq!(commands[4], Command::SetSamplerState(sampler));
        assert_eq!(
            backend.uniform(program, "u_time"),
            Some(UniformValue::Float(3.0))
        );
    }
}
