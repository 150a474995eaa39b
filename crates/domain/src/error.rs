//! Message errors
//!
//! One family per concern: the envelope itself, the payloads it carries, and
//! the unwrapping step that joins the two.

use chrono::{DateTime, Utc};
use relaynet_core::Asn1Error;
use relaynet_identity::EnvelopedDataError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RamfError {
    #[error("Serialization is too short to contain a format signature")]
    TooShort,

    #[error("Format signature should start with magic constant 'Relaynet'")]
    InvalidMagicConstant,

    #[error("Message type should be {expected:#04x} (got {actual:#04x})")]
    UnexpectedType { expected: u8, actual: u8 },

    #[error("Message version should be {expected:#04x} (got {actual:#04x})")]
    UnexpectedVersion { expected: u8, actual: u8 },

    #[error("Message fields are not a valid DER sequence: {0}")]
    Fields(#[from] Asn1Error),

    #[error("Message should contain 5 fields (got {0})")]
    InvalidFieldCount(usize),

    #[error("{field} should only contain visible ASCII characters")]
    InvalidCharacters { field: &'static str },

    #[error("Recipient address should not span more than {max} characters (got {actual})")]
    RecipientAddressTooLong { max: usize, actual: usize },

    #[error("Message id should not span more than {max} characters (got {actual})")]
    MessageIdTooLong { max: usize, actual: usize },

    #[error("TTL should not be greater than {max} seconds (got {actual})")]
    TtlTooLong { max: u32, actual: u64 },

    #[error("Payload should not span more than {max} octets (got {actual})")]
    PayloadTooLarge { max: usize, actual: usize },

    #[error("Creation time should be in UTC (got {0})")]
    NonUtcCreationTime(String),

    #[error("Creation time should be between years 0 and 9999 (got {0})")]
    CreationTimeOutOfRange(DateTime<Utc>),

    #[error("Creation time is malformed (got {0})")]
    MalformedCreationTime(String),

    #[error("Creation time is in the future ({0})")]
    CreatedInFuture(DateTime<Utc>),

    #[error("Message expired at {0}")]
    Expired(DateTime<Utc>),
}

#[derive(Error, Debug)]
pub enum PayloadError {
    #[error("Payload is malformed: {0}")]
    Malformed(#[from] Asn1Error),

    #[error("Payload should contain {expected} fields (got {actual})")]
    InvalidFieldCount { expected: usize, actual: usize },

    #[error(transparent)]
    Encryption(#[from] EnvelopedDataError),
}

/// Failure to recover the payload of an encrypted message.
///
/// Errors from the envelope layer are passed through unchanged.
#[derive(Error, Debug)]
pub enum UnwrapError {
    #[error(transparent)]
    EnvelopedData(#[from] EnvelopedDataError),

    #[error(transparent)]
    Payload(#[from] PayloadError),
}

pub type Result<T> = std::result::Result<T, RamfError>;
