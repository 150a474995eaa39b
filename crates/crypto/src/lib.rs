//! Cryptographic primitives for the Relaynet trust stack.
//!
//! This crate wraps the vetted primitives the envelope and certificate
//! codecs are built on. It never implements a primitive itself.
//!
//! # Supported Algorithms
//!
//! - **Key encryption and signatures**: RSA (2048 bits or more), with
//!   RSA-OAEP/SHA-256 for key transport and PKCS#1 v1.5/SHA-256 signatures
//! - **Hashing**: SHA-256 (key identifiers)
//! - **Content encryption**: AES-GCM with 128, 192 or 256-bit keys
//!
//! # Security Principles
//!
//! - Randomness is always supplied by the caller, never taken implicitly
//! - Symmetric keys and encoded private keys are zeroized on drop
//! - Key material and plaintext are never logged

pub mod error;
pub mod keys;
pub mod oids;
pub mod symmetric;

pub use error::{CryptoError, CryptoResult};
pub use keys::{
    generate_rsa_key_pair, private_key_from_der, private_key_to_der, public_key_digest,
    public_key_from_der, public_key_to_der, sha256_digest, RsaKeyPair, SHA256_LENGTH,
};
pub use symmetric::{SymmetricCipher, NONCE_LENGTH, TAG_LENGTH};

// Re-exported so downstream crates name the same RSA types.
pub use rsa::{RsaPrivateKey, RsaPublicKey};
