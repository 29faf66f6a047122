//! Error types for the text layer.

use protoarr_core::CodecError;

/// Errors produced while converting between arrays and their JSON text.
#[derive(Debug, thiserror::Error)]
pub enum TextError {
    /// The input is not valid JSON.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// The top-level JSON value is not an array.
    #[error("expected a JSON array, found {found}")]
    NotAnArray { found: &'static str },

    /// A JSON object appeared inside the array; positional arrays never
    /// contain objects.
    #[error("unexpected JSON object at {path}")]
    UnexpectedObject { path: String },

    /// A bytes value cannot be written as a JSON string.
    #[error("bytes at {path} are not valid UTF-8")]
    NonUtf8Bytes { path: String },

    /// NaN and infinities have no JSON representation.
    #[error("non-finite float {value} at {path}")]
    NonFiniteFloat { path: String, value: f64 },

    #[error(transparent)]
    Codec(#[from] CodecError),
}
