use thiserror::Error;

/// Errors produced by type-level operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    /// A type-name string could not be mapped to a known property type.
    #[error("unknown property type: {0}")]
    UnknownPropertyType(String),

    /// A textual value could not be decoded as the named type.
    #[error("invalid value for type {data_type}: {text:?}")]
    InvalidValue { data_type: String, text: String },

    #[error("invalid identifier: {0}")]
    InvalidId(String),

    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    #[error("invalid byte length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}
