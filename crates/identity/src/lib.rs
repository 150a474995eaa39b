//! Identity and trust primitives for Relaynet nodes.
//!
//! Nodes establish trust in each other through X.509 certificates, and
//! protect payloads for a specific node through CMS EnvelopedData addressed
//! to that node's certificate.
//!
//! # Core Concepts
//!
//! - **Certificate**: an immutable, DER-backed X.509 v3 certificate issued
//!   under the chain-of-trust rules (CA flag, path length constraint,
//!   key identifier linkage)
//! - **EnvelopedData**: a payload encrypted with AES-GCM whose key is wrapped
//!   with RSA-OAEP for exactly one recipient certificate
//!
//! # Security Model
//!
//! - Randomness (serial numbers, content keys, nonces) comes from a source
//!   passed in by the caller
//! - Decryption failures are reported uniformly and never yield
//!   unauthenticated plaintext
//! - Full certification path validation and revocation are left to callers

pub mod enveloped_data;
pub mod error;
pub mod pki;

pub use enveloped_data::{EnvelopedData, RsaOaepParams};
pub use error::{
    BoxedCause, CertificateError, CertificateResult, EnvelopedDataError, EnvelopedDataResult,
};
pub use pki::{Certificate, CertificateRequest, MAX_PATH_LENGTH_CONSTRAINT};
