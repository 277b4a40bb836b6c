/// Convenience result type used across glyphgrid.
pub type GlyphgridResult<T> = Result<T, GlyphgridError>;

/// Top-level error taxonomy used by engine APIs.
///
/// The split follows how failures surface at runtime: `Config` aborts startup
/// with a diagnostic, `Protocol` is a producer/consumer contract violation and
/// is fatal, while scene-side misuse (buffer edits on missing cells) is a
/// silent no-op and never reaches this type.
#[derive(thiserror::Error, Debug)]
pub enum GlyphgridError {
    /// Missing or malformed project resources (settings file, font file).
    #[error("config error: {0}")]
    Config(String),

    /// Invalid user-provided data detected before the frame loop starts.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors while scheduling or advancing dot animations.
    #[error("animation error: {0}")]
    Animation(String),

    /// Producer/consumer wire contract violation (e.g. an unregistered
    /// content key referenced at render time).
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Rasterization or display failures on the consumer side.
    #[error("render error: {0}")]
    Render(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl GlyphgridError {
    /// Build a [`GlyphgridError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`GlyphgridError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`GlyphgridError::Animation`] value.
    pub fn animation(msg: impl Into<String>) -> Self {
        Self::Animation(msg.into())
    }

    /// Build a [`GlyphgridError::Protocol`] value.
    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::Protocol(msg.into())
    }

    /// Build a [`GlyphgridError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }
}
