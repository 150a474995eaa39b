//! Integration tests across the Relaynet crates
//!
//! This test suite validates:
//! - Certificate chains: CA issuance, path length constraints, key identifier linkage
//! - Envelope encryption addressed to freshly issued certificates
//! - Parcel and cargo delivery with encrypted payloads, end to end over the wire format
//! - Configuration loading and logging bootstrap

#[cfg(test)]
pub mod test_utils;

#[cfg(test)]
mod chain_of_trust_tests;

#[cfg(test)]
mod envelope_encryption_tests;

#[cfg(test)]
mod message_delivery_tests;

#[cfg(test)]
mod config_tests;
