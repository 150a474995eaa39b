//! Core functionality for the Relaynet store-and-forward messaging network.
//!
//! This crate provides the pieces shared by every other Relaynet crate: the
//! positional DER sequence codec used on the wire, error types, logging
//! bootstrap and configuration.

pub mod asn1;
pub mod config;
pub mod error;
pub mod logging;

pub use config::{Config, EncryptionConfig, KeyConfig, RamfLimits};
pub use error::{Asn1Error, Asn1Result, CoreError, Result};
