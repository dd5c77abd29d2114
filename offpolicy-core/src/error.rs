//! Errors in the library.
use thiserror::Error;

/// Errors in the library.
#[derive(Error, Debug, PartialEq)]
pub enum OffPolicyError {
    /// Configuration violates a constraint of the training loop.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Sampling was requested from a buffer holding no transitions.
    #[error("Insufficient data: requested {requested} samples from a buffer of size {size}")]
    InsufficientData {
        /// Requested batch size.
        requested: usize,

        /// Number of transitions in the buffer.
        size: usize,
    },

    /// A row of a field has an unexpected width.
    #[error("Field '{field}' has width {actual}, expected {expected}")]
    FieldShape {
        /// Name of the field.
        field: String,

        /// Width declared in the schema.
        expected: usize,

        /// Width of the given row.
        actual: usize,
    },

    /// A field of the schema is absent from a transition or a batch.
    #[error("Missing field: {0}")]
    MissingField(String),

    /// Record key error.
    #[error("Record key error: {0}")]
    RecordKeyError(String),

    /// Record value type error.
    #[error("Record value type error: {0}")]
    RecordValueTypeError(String),
}
