//! Configuration management for Relaynet.
//!
//! Defaults match the protocol limits, so most callers never load a file.

use serde::{Deserialize, Serialize};
#[cfg(feature = "toml")]
use std::path::Path;

#[cfg(feature = "toml")]
use crate::error::{CoreError, Result};

/// Minimum RSA modulus accepted for node keys.
pub const MIN_RSA_MODULUS_BITS: usize = 2048;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub keys: KeyConfig,
    pub ramf: RamfLimits,
    pub encryption: EncryptionConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyConfig {
    pub rsa_modulus_bits: usize,
}

/// Size limits applied to RAMF message fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RamfLimits {
    pub max_recipient_address_length: usize,
    pub max_message_id_length: usize,
    /// Seconds
    pub max_ttl: u32,
    /// Bytes
    pub max_payload_length: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncryptionConfig {
    /// One of `aes-128-gcm`, `aes-192-gcm` or `aes-256-gcm`
    pub default_cipher: String,
}

impl Default for KeyConfig {
    fn default() -> Self {
        Self {
            rsa_modulus_bits: MIN_RSA_MODULUS_BITS,
        }
    }
}

impl Default for RamfLimits {
    fn default() -> Self {
        Self {
            max_recipient_address_length: 1024,
            max_message_id_length: 64,
            max_ttl: 15_552_000,
            max_payload_length: 8 * 1024 * 1024,
        }
    }
}

impl Default for EncryptionConfig {
    fn default() -> Self {
        Self {
            default_cipher: "aes-128-gcm".to_string(),
        }
    }
}

impl Config {
    #[cfg(feature = "toml")]
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| CoreError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    #[cfg(feature = "toml")]
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    #[cfg(feature = "toml")]
    fn validate(&self) -> Result<()> {
        if self.keys.rsa_modulus_bits < MIN_RSA_MODULUS_BITS {
            return Err(CoreError::Config(format!(
                "RSA modulus must be at least {} bits (got {})",
                MIN_RSA_MODULUS_BITS, self.keys.rsa_modulus_bits
            )));
        }
        Ok(())
    }
}

#[cfg(all(test, feature = "toml"))]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_protocol_limits() {
        let config = Config::default();

        assert_eq!(config.keys.rsa_modulus_bits, 2048);
        assert_eq!(config.ramf.max_recipient_address_length, 1024);
        assert_eq!(config.ramf.max_message_id_length, 64);
        assert_eq!(config.ramf.max_ttl, 180 * 24 * 60 * 60);
        assert_eq!(config.ramf.max_payload_length, 8_388_608);
        assert_eq!(config.encryption.default_cipher, "aes-128-gcm");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml_str(
            r#"
            [keys]
            rsa_modulus_bits = 4096

            [encryption]
            default_cipher = "aes-256-gcm"
            "#,
        )
        .unwrap();

        assert_eq!(config.keys.rsa_modulus_bits, 4096);
        assert_eq!(config.encryption.default_cipher, "aes-256-gcm");
        assert_eq!(config.ramf, RamfLimits::default());
    }

    #[test]
    fn test_small_modulus_rejected() {
        let result = Config::from_toml_str("[keys]\nrsa_modulus_bits = 1024\n");

        assert!(matches!(result, Err(CoreError::Config(_))));
    }

    #[test]
    fn test_malformed_toml_rejected() {
        assert!(Config::from_toml_str("[keys\n").is_err());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = Config::from_file("/nonexistent/relaynet.toml");

        assert!(matches!(result, Err(CoreError::Io(_))));
    }
}
