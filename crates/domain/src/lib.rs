//! Relaynet messages
//!
//! This crate contains the message layer of the network:
//! - The RAMF envelope shared by every message
//! - Encrypted payloads and the capability to unwrap them
//! - Parcels and cargo, and the payloads they carry

pub mod encrypted;
pub mod error;
pub mod messages;
pub mod payloads;
pub mod ramf;

pub use encrypted::{EncryptedMessage, Payload};
pub use error::{PayloadError, RamfError, Result, UnwrapError};
pub use messages::{Cargo, Parcel, CARGO_FORMAT_SIGNATURE, PARCEL_FORMAT_SIGNATURE};
pub use payloads::{CargoMessageSet, ServiceMessage};
pub use ramf::{FormatSignature, MessageFields, RamfMessage, FORMAT_SIGNATURE_LENGTH};
