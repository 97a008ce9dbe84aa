//! Error type for snapshot capture, restore, merge, and decoding.

use thiserror::Error;

use arbor_types::TypeError;

/// Errors surfaced by snapshot operations.
#[derive(Debug, Error)]
pub enum MementoError {
    /// A snapshot was merged into a live node of a different class.
    #[error("class mismatch: snapshot records `{expected}`, live node is `{actual}`")]
    ClassMismatch { expected: String, actual: String },

    /// A document element did not satisfy the codec vocabulary.
    #[error("malformed document: {0}")]
    MalformedDocument(String),

    /// A property value failed to decode.
    #[error(transparent)]
    Type(#[from] TypeError),
}
