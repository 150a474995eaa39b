//! Core error types

use thiserror::Error;

/// Core error type for Relaynet
#[derive(Debug, Error)]
pub enum CoreError {
    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// Logging subscriber could not be installed
    #[error("Logging error: {0}")]
    Logging(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while encoding or decoding DER sequences.
///
/// The messages are stable: callers and tests match on them.
#[derive(Debug, Error)]
pub enum Asn1Error {
    #[error("Value is empty")]
    EmptyValue,

    #[error("Value is not DER-encoded")]
    NotDer,

    #[error("Value is not an ASN.1 sequence")]
    NotASequence,

    #[error("Sequence contains explicitly tagged item")]
    ExplicitlyTaggedItem,

    #[error("Sequence contains untagged item")]
    UntaggedItem,

    #[error("Sequence cannot contain more than {max} items (got {length})")]
    SequenceTooLong { length: usize, max: usize },

    /// A tagged element could not be read as the requested type
    #[error("Value is not {expected}")]
    InvalidValue {
        expected: &'static str,
        #[source]
        source: der::Error,
    },

    #[error("Could not DER-encode value: {0}")]
    Encoding(#[from] der::Error),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Result type for sequence codec operations.
pub type Asn1Result<T> = std::result::Result<T, Asn1Error>;
