use crate::types::ResourceKind;

/// Errors from the render layer and its backends.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("could not create {kind}: {reason}")]
    Creation { kind: ResourceKind, reason: String },
    #[error("{0} is already created")]
    AlreadyCreated(ResourceKind),
    #[error("{0} is not created")]
    NotCreated(ResourceKind),
    #[error("stale or unknown {0} handle")]
    InvalidHandle(ResourceKind),
    #[error("shader compile error: {0}")]
    ShaderCompile(String),
    #[error("shader reflection error: {0}")]
    Reflection(String),
    #[error("draw is missing {0}")]
    MissingBinding(&'static str),
    #[error("draw reads {needed} bytes of vertex data but the buffer holds {available}")]
    DrawOutOfRange { needed: usize, available: usize },
    #[error("surface error: {0}")]
    Surface(String),
    #[error(transparent)]
    Asset(#[from] orrery_assets::AssetError),
}

impl RenderError {
    pub fn creation(kind: ResourceKind, reason: impl Into<String>) -> Self {
        Self::Creation {
            kind,
            reason: reason.into(),
        }
    }
}
