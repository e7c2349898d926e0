//! Engine error taxonomy.

use thiserror::Error;

/// Errors produced by the render core.
#[derive(Error, Debug)]
pub enum EngineError {
    /// No GPU context backend could be acquired. Fatal for initialization.
    #[error("no GPU context available: {0}")]
    ContextUnavailable(String),

    /// A shader failed to compile or link. Fatal for that program only;
    /// the renderer falls back to the default program.
    #[error("shader '{name}' failed to compile: {diagnostic}")]
    Shader {
        /// Name of the failing program.
        name: String,
        /// Compiler diagnostic text.
        diagnostic: String,
    },

    /// Caller error: degenerate shape or projection parameters.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The camera up vector is parallel to the view direction.
    #[error("degenerate camera basis: up is parallel to the view direction")]
    DegenerateBasis,

    /// A handle was used after `dispose()`. Programming error.
    #[error("resource used after dispose")]
    ResourceDisposed,

    /// The named scene does not exist.
    #[error("scene '{0}' not found")]
    SceneNotFound(String),

    /// The GPU context was lost. All cached handles are invalid until
    /// recovery recompiles shaders and re-uploads retained data.
    #[error("GPU context lost")]
    ContextLost,

    /// An image failed to decode during texture loading.
    #[error("texture '{name}' failed to decode: {reason}")]
    TextureDecode {
        /// Name of the texture entry.
        name: String,
        /// Decoder error text.
        reason: String,
    },
}

impl EngineError {
    /// Shorthand for an invalid-argument error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_diagnostic() {
        let err = EngineError::Shader {
            name: "lit".into(),
            diagnostic: "expected ';'".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("lit"));
        assert!(msg.contains("expected ';'"));
    }
}
