use orrery_kernel::SystemError;
use orrery_render::RenderError;
use std::fmt;

/// Steps of the startup sequence, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Framebuffers,
    Shaders,
    Textures,
    Samplers,
    Buffers,
    Layouts,
    Skybox,
    Models,
    Misc,
}

impl Stage {
    pub const ALL: [Stage; 9] = [
        Stage::Framebuffers,
        Stage::Shaders,
        Stage::Textures,
        Stage::Samplers,
        Stage::Buffers,
        Stage::Layouts,
        Stage::Skybox,
        Stage::Models,
        Stage::Misc,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Stage::Framebuffers => "framebuffers",
            Stage::Shaders => "shader programs",
            Stage::Textures => "textures",
            Stage::Samplers => "sampler states",
            Stage::Buffers => "vertex buffers",
            Stage::Layouts => "vertex layouts",
            Stage::Skybox => "skybox",
            Stage::Models => "models",
            Stage::Misc => "misc resources",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A startup stage that failed, and why.
#[derive(Debug, thiserror::Error)]
#[error("could not create {stage}: {source}")]
pub struct StartupError {
    pub stage: Stage,
    #[source]
    pub source: RenderError,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("could not initialize context")]
    Context,
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error("invalid body table: {0}")]
    System(#[from] SystemError),
}
