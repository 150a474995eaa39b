//! Error types for key management and symmetric encryption.

use thiserror::Error;

/// Errors that can occur in cryptographic primitive operations.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("RSA modulus must be at least {min} bits (got {actual})")]
    ModulusTooSmall { min: usize, actual: usize },

    #[error("Key generation failed: {0}")]
    KeyGeneration(#[source] rsa::Error),

    #[error("Key encoding failed: {0}")]
    KeyEncoding(String),

    #[error("Key decoding failed: {0}")]
    KeyDecoding(String),

    #[error("Unsupported symmetric cipher: {0}")]
    UnsupportedCipher(String),

    #[error("Invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("Invalid nonce length: expected {expected}, got {actual}")]
    InvalidNonceLength { expected: usize, actual: usize },

    #[error("Encryption failed")]
    Encryption,

    /// Authentication tag did not verify; deliberately carries no detail
    #[error("Decryption failed")]
    Decryption,
}

/// Result type for cryptographic operations.
pub type CryptoResult<T> = Result<T, CryptoError>;
