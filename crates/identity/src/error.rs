//! Error types for certificate and envelope operations.
//!
//! Each component gets its own closed error family so callers can match on
//! the kind of failure without string inspection.

use chrono::{DateTime, Utc};
use der::asn1::ObjectIdentifier;
use relaynet_crypto::CryptoError;
use thiserror::Error;

/// Boxed cause carried by encryption and decryption failures.
pub type BoxedCause = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur while issuing, parsing or checking certificates.
#[derive(Debug, Error)]
pub enum CertificateError {
    #[error("CommonName should not be empty")]
    EmptyCommonName,

    #[error("The end date must be later than the start date")]
    InvalidValidityPeriod,

    #[error("pathLenConstraint should be between 0 and 2 (got {0})")]
    PathLenConstraintOutOfRange(u8),

    #[error("Subject should be a CA if pathLenConstraint={0}")]
    NonCaWithPathLenConstraint(u8),

    #[error("Issuer certificate should have basic constraints extension")]
    IssuerMissingBasicConstraints,

    #[error("Issuer certificate should be marked as CA")]
    IssuerNotCa,

    #[error("Date {0} cannot be represented in a certificate")]
    UnrepresentableDate(DateTime<Utc>),

    /// Input is not a certificate this library can work with
    #[error("Value should be a DER-encoded, X.509 v3 certificate")]
    Malformed {
        #[source]
        source: Option<der::Error>,
    },

    #[error("Certificate was not issued by the given issuer")]
    IssuerMismatch,

    #[error("Certificate signature is invalid")]
    InvalidSignature,

    #[error("Could not sign certificate: {0}")]
    Signing(String),

    #[error("Key error: {0}")]
    Key(#[from] CryptoError),

    #[error("Could not DER-encode certificate: {0}")]
    Encoding(#[from] der::Error),
}

/// Errors that can occur while producing or consuming an EnvelopedData value.
#[derive(Debug, Error)]
pub enum EnvelopedDataError {
    #[error("Value is not a DER-encoded CMS EnvelopedData structure")]
    Malformed(#[source] der::Error),

    #[error("ContentInfo should wrap EnvelopedData (got {0})")]
    UnexpectedContentType(ObjectIdentifier),

    #[error("EnvelopedData should have exactly one recipient (got {0})")]
    InvalidRecipientCount(usize),

    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(ObjectIdentifier),

    #[error("Could not encrypt value")]
    Encryption(#[source] BoxedCause),

    /// Wrong key, failed tag check or unusable container; the cause is kept
    /// for diagnostics but never surfaced in the message
    #[error("Could not decrypt value")]
    Decryption(#[source] BoxedCause),

    #[error("Could not DER-encode EnvelopedData: {0}")]
    Encoding(#[from] der::Error),
}

/// Result type for certificate operations.
pub type CertificateResult<T> = Result<T, CertificateError>;

/// Result type for EnvelopedData operations.
pub type EnvelopedDataResult<T> = Result<T, EnvelopedDataError>;
