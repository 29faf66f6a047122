//! Error types for the transcoding layer.

/// Error returned by the encoder, the decoder and schema providers.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// An array position has no field declaration in the schema.
    #[error("no field number {number} declared in '{schema_name}'")]
    UnknownFieldNumber { schema_name: String, number: u32 },

    /// A value has the wrong shape for the field it is assigned to.
    #[error("type mismatch on field '{field}': {source}")]
    TypeMismatch {
        field: String,
        #[source]
        source: ValueTypeError,
    },

    /// An integer value does not fit the field's native width.
    #[error("value {value} out of range for field '{field}'")]
    ValueOutOfRange { field: String, value: String },

    /// The schema source does not know the requested message type.
    #[error("message type '{type_name}' not found")]
    SchemaNotFound { type_name: String },

    /// Schema data is structurally invalid (e.g., duplicate or zero field numbers).
    #[error("invalid schema '{schema_name}': {detail}")]
    SchemaInvalid { schema_name: String, detail: String },

    /// Schema data (e.g., a serialized `FileDescriptorSet`) could not be parsed.
    #[error("failed to parse schema: {source}")]
    SchemaParse {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The message provider failed to read or write a field.
    #[error("cannot access field '{field}': {detail}")]
    FieldAccess { field: String, detail: String },
}

impl CodecError {
    pub fn type_mismatch(field: &str, source: ValueTypeError) -> Self {
        Self::TypeMismatch {
            field: field.to_string(),
            source,
        }
    }
}

/// A [`Value`](crate::Value) did not have the variant a caller expected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("expected {expected}, got {actual}")]
pub struct ValueTypeError {
    pub expected: String,
    pub actual: &'static str,
}

impl ValueTypeError {
    pub fn new(expected: impl Into<String>, actual: &'static str) -> Self {
        Self {
            expected: expected.into(),
            actual,
        }
    }
}
