//! Error types for the annotator engine.

use ritease_render::RenderError;
use thiserror::Error;

/// Errors produced by the annotator.
#[derive(Debug, Error)]
pub enum AnnotatorError {
    /// Upload rejected because its MIME type is neither PDF nor image.
    #[error("Unsupported file type: {mime}")]
    UnsupportedFileType { mime: String },

    /// Export could not start (no document, no drawing surface).
    #[error("Export precondition failed: {0}")]
    ExportPrecondition(String),

    /// The requested export format cannot be produced for this document.
    #[error("Cannot export {document} document as {format}")]
    UnsupportedExport {
        document: &'static str,
        format: &'static str,
    },

    /// Source payload could not be decoded.
    #[error("Failed to decode document: {0}")]
    Decode(String),

    /// Color string is not `#RRGGBB` or `#RGB`.
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    /// SVG overlay could not be written.
    #[error("Failed to write SVG overlay: {0}")]
    Overlay(String),

    /// Rendering backend failure.
    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AnnotatorError {
    pub fn unsupported_file_type(mime: impl Into<String>) -> Self {
        Self::UnsupportedFileType { mime: mime.into() }
    }

    pub fn export_precondition(reason: impl Into<String>) -> Self {
        Self::ExportPrecondition(reason.into())
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    pub fn invalid_color(value: impl Into<String>) -> Self {
        Self::InvalidColor(value.into())
    }
}

impl From<image::ImageError> for AnnotatorError {
    fn from(err: image::ImageError) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<base64::DecodeError> for AnnotatorError {
    fn from(err: base64::DecodeError) -> Self {
        Self::Decode(err.to_string())
    }
}

/// Result alias for annotator operations.
pub type Result<T> = std::result::Result<T, AnnotatorError>;
