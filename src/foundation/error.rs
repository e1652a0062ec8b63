/// Convenience result type used across glitchgrid.
pub type GlitchResult<T> = Result<T, GlitchError>;

/// Top-level error type for the fallible edges of glitchgrid.
///
/// The sketch itself never fails: missing buffers and unready media are silent no-ops. Errors
/// only come from configuration, asset decoding, capture startup and encoding.
#[derive(thiserror::Error, Debug)]
pub enum GlitchError {
    /// Invalid configuration or input values.
    #[error("validation error: {0}")]
    Validation(String),

    /// Media loading, decoding or capture failures.
    #[error("media error: {0}")]
    Media(String),

    /// Rendering or encoding failures.
    #[error("render error: {0}")]
    Render(String),

    /// Serialization and deserialization failures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl GlitchError {
    /// Build a [`GlitchError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`GlitchError::Media`] value.
    pub fn media(msg: impl Into<String>) -> Self {
        Self::Media(msg.into())
    }

    /// Build a [`GlitchError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`GlitchError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
