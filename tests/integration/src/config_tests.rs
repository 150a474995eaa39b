//! Configuration loading and logging bootstrap

use relaynet_core::{logging, Config, CoreError};
use relaynet_crypto::{RsaKeyPair, SymmetricCipher};
use relaynet_domain::{MessageFields, Parcel, RamfError};

/// Limits and cipher selection loaded from TOML drive the message layer
#[test]
fn test_config_from_file_drives_limits_and_cipher() {
    let path = std::env::temp_dir().join(format!("relaynet_{}.toml", uuid::Uuid::new_v4()));
    std::fs::write(
        &path,
        r#"
[ramf]
max_payload_length = 16

[encryption]
default_cipher = "aes-256-gcm"
"#,
    )
    .unwrap();

    let config = Config::from_file(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(
        SymmetricCipher::from_config(&config.encryption).unwrap(),
        SymmetricCipher::Aes256Gcm
    );
    assert_eq!(config.ramf.max_message_id_length, 64);
    assert_eq!(config.keys.rsa_modulus_bits, 2048);

    let fields = MessageFields::new("0deadbeef", 60, vec![0u8; 17]);
    assert!(matches!(
        Parcel::with_limits(fields, &config.ramf),
        Err(RamfError::PayloadTooLarge { max: 16, actual: 17 })
    ));
}

/// Moduli below 2048 bits are rejected when loading
#[test]
fn test_config_rejects_small_modulus() {
    let result = Config::from_toml_str("[keys]\nrsa_modulus_bits = 1024\n");

    assert!(matches!(result, Err(CoreError::Config(_))));
}

/// Key generation follows the configured modulus length
#[test]
fn test_key_generation_from_default_config() {
    let key_pair =
        RsaKeyPair::generate_with_config(&Config::default().keys, &mut rand::thread_rng())
            .unwrap();

    assert_eq!(key_pair.modulus_bits(), 2048);
}

/// A second global subscriber cannot be installed
#[test]
fn test_logging_init_only_once() {
    let _ = logging::init();

    assert!(matches!(logging::init(), Err(CoreError::Logging(_))));
    tracing::info!("logging initialized");
}
