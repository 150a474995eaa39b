//! Envelope encryption addressed to issued certificates

use crate::test_utils::TestNode;
use relaynet_crypto::SymmetricCipher;
use relaynet_identity::{EnvelopedData, EnvelopedDataError};

/// Encrypting "hello" for a certificate and decrypting with its key
#[test]
fn test_encrypt_for_certificate_and_decrypt() {
    let recipient = TestNode::self_issued("recipient", 0, false, 0);

    let enveloped_data = EnvelopedData::encrypt(
        b"hello",
        &recipient.certificate,
        SymmetricCipher::default(),
        &mut rand::thread_rng(),
    )
    .unwrap();
    let serialization = enveloped_data.serialize().unwrap();

    let received = EnvelopedData::deserialize(&serialization).unwrap();
    assert_eq!(
        received.decrypt(&recipient.key_pair.private_key).unwrap(),
        b"hello"
    );
    assert_eq!(received.recipient_issuer(), recipient.certificate.issuer());
    assert_eq!(
        received.recipient_serial_number(),
        recipient.certificate.serial_number()
    );
}

/// Decrypting with an unrelated key fails without yielding plaintext
#[test]
fn test_decrypt_with_unrelated_key_fails() {
    let recipient = TestNode::self_issued("recipient", 0, false, 0);
    let eavesdropper = TestNode::self_issued("eavesdropper", 1, false, 0);

    let enveloped_data = EnvelopedData::encrypt(
        b"hello",
        &recipient.certificate,
        SymmetricCipher::default(),
        &mut rand::thread_rng(),
    )
    .unwrap();

    let result = enveloped_data.decrypt(&eavesdropper.key_pair.private_key);

    assert!(matches!(result, Err(EnvelopedDataError::Decryption(_))));
}

/// Each encryption uses a fresh content key and nonce
#[test]
fn test_encryptions_are_randomized() {
    let recipient = TestNode::self_issued("recipient", 0, false, 0);
    let mut rng = rand::thread_rng();

    let serialization1 = EnvelopedData::encrypt(
        b"hello",
        &recipient.certificate,
        SymmetricCipher::default(),
        &mut rng,
    )
    .unwrap()
    .serialize()
    .unwrap();
    let serialization2 = EnvelopedData::encrypt(
        b"hello",
        &recipient.certificate,
        SymmetricCipher::default(),
        &mut rng,
    )
    .unwrap()
    .serialize()
    .unwrap();

    assert_ne!(serialization1, serialization2);
}
