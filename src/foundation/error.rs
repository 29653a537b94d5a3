/// Convenience result type used across glyphstack.
pub type GlyphstackResult<T> = Result<T, GlyphstackError>;

/// Top-level error taxonomy used by the editing, conversion and export APIs.
///
/// Out-of-bounds brush and pointer coordinates are deliberately absent: they
/// are reported as `None` or skipped, never as errors.
#[derive(thiserror::Error, Debug)]
pub enum GlyphstackError {
    /// Malformed color string (not a 6-digit hex value).
    #[error("invalid color: {0}")]
    InvalidColor(String),

    /// Invalid user-provided arguments or layer data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Structurally invalid project payload.
    #[error("malformed project file: {0}")]
    MalformedProject(String),

    /// Source raster could not be decoded.
    #[error("image decode failure: {0}")]
    ImageDecode(String),

    /// No visible layer with content qualified for export.
    #[error("nothing to export")]
    EmptyExport,

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl GlyphstackError {
    /// Build a [`GlyphstackError::InvalidColor`] value.
    pub fn invalid_color(msg: impl Into<String>) -> Self {
        Self::InvalidColor(msg.into())
    }

    /// Build a [`GlyphstackError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`GlyphstackError::MalformedProject`] value.
    pub fn malformed_project(msg: impl Into<String>) -> Self {
        Self::MalformedProject(msg.into())
    }

    /// Build a [`GlyphstackError::ImageDecode`] value.
    pub fn image_decode(msg: impl Into<String>) -> Self {
        Self::ImageDecode(msg.into())
    }

    /// Build a [`GlyphstackError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
