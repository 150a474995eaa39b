//! Parcel and cargo delivery through the wire format

use crate::test_utils::TestNode;
use relaynet_crypto::SymmetricCipher;
use relaynet_domain::{
    Cargo, CargoMessageSet, EncryptedMessage, MessageFields, Parcel, Payload, ServiceMessage,
    UnwrapError,
};
use relaynet_identity::EnvelopedDataError;

/// A parcel travels from sender to recipient and its payload is unwrapped
#[test]
fn test_parcel_delivery() {
    let _ = tracing_subscriber::fmt::try_init();
    let recipient = TestNode::self_issued("endpoint", 0, false, 0);
    let service_message = ServiceMessage::new("text/plain", b"the payload".to_vec());

    let payload = service_message
        .encrypt(
            &recipient.certificate,
            SymmetricCipher::default(),
            &mut rand::thread_rng(),
        )
        .unwrap();
    let parcel = Parcel::new(MessageFields::new("0deadbeef", 3600, payload)).unwrap();
    let serialization = parcel.serialize().unwrap();

    let received = Parcel::deserialize(&serialization).unwrap();
    assert_eq!(received, parcel);
    received
        .ramf()
        .fields()
        .validate_timing(chrono::Utc::now())
        .unwrap();
    assert_eq!(
        received
            .unwrap_payload(&recipient.key_pair.private_key)
            .unwrap(),
        service_message
    );
}

/// A cargo bundles serialized parcels for a gateway
#[test]
fn test_cargo_delivery() {
    let gateway = TestNode::self_issued("gateway", 1, true, 0);
    let parcel = Parcel::new(MessageFields::new("0deadbeef", 3600, b"opaque".to_vec()))
        .unwrap()
        .serialize()
        .unwrap();
    let message_set = CargoMessageSet::new(vec![parcel.clone()]);

    let payload = message_set
        .encrypt(
            &gateway.certificate,
            SymmetricCipher::Aes192Gcm,
            &mut rand::thread_rng(),
        )
        .unwrap();
    let cargo = Cargo::new(MessageFields::new("https://gateway.example", 3600, payload)).unwrap();

    let received = Cargo::deserialize(&cargo.serialize().unwrap()).unwrap();
    let unwrapped = received
        .unwrap_payload(&gateway.key_pair.private_key)
        .unwrap();

    assert_eq!(unwrapped.messages.len(), 1);
    let bundled_parcel = Parcel::deserialize(&unwrapped.messages[0]).unwrap();
    assert_eq!(bundled_parcel.ramf().payload(), b"opaque");
}

/// The wrong private key surfaces the envelope's decryption error unchanged
#[test]
fn test_unwrap_with_wrong_key_fails() {
    let recipient = TestNode::self_issued("endpoint", 0, false, 0);
    let other = TestNode::self_issued("other", 1, false, 0);

    let payload = ServiceMessage::new("text/plain", b"secret".to_vec())
        .encrypt(
            &recipient.certificate,
            SymmetricCipher::default(),
            &mut rand::thread_rng(),
        )
        .unwrap();
    let parcel = Parcel::new(MessageFields::new("0deadbeef", 3600, payload)).unwrap();

    let error = parcel
        .unwrap_payload(&other.key_pair.private_key)
        .unwrap_err();

    assert!(matches!(
        error,
        UnwrapError::EnvelopedData(EnvelopedDataError::Decryption(_))
    ));
    assert_eq!(error.to_string(), "Could not decrypt value");
}
