//! Encrypted payloads
//!
//! Messages whose payload is an EnvelopedData value implement
//! [`EncryptedMessage`]; the plaintext inside is a [`Payload`].

use rand::{CryptoRng, RngCore};
use relaynet_crypto::SymmetricCipher;
use relaynet_identity::{Certificate, EnvelopedData};
use rsa::RsaPrivateKey;
use zeroize::Zeroizing;

use crate::error::{PayloadError, UnwrapError};
use crate::ramf::RamfMessage;

/// Plaintext carried inside an encrypted message.
pub trait Payload: Sized {
    fn serialize(&self) -> Result<Vec<u8>, PayloadError>;

    fn deserialize(serialization: &[u8]) -> Result<Self, PayloadError>;

    /// Serialize and encrypt for the holder of `recipient`'s private key,
    /// producing the bytes to use as the message payload.
    fn encrypt<R: CryptoRng + RngCore>(
        &self,
        recipient: &Certificate,
        cipher: SymmetricCipher,
        rng: &mut R,
    ) -> Result<Vec<u8>, PayloadError> {
        let plaintext = Zeroizing::new(self.serialize()?);
        let enveloped_data = EnvelopedData::encrypt(&plaintext, recipient, cipher, rng)?;
        Ok(enveloped_data.serialize()?)
    }
}

/// A RAMF message whose payload is encrypted for its recipient.
pub trait EncryptedMessage {
    type Payload: Payload;

    fn ramf(&self) -> &RamfMessage;

    /// Decrypt the payload with the recipient's private key and decode it.
    fn unwrap_payload(&self, private_key: &RsaPrivateKey) -> Result<Self::Payload, UnwrapError> {
        let enveloped_data = EnvelopedData::deserialize(self.ramf().payload())?;
        let plaintext = Zeroizing::new(enveloped_data.decrypt(private_key)?);
        Ok(Self::Payload::deserialize(&plaintext)?)
    }
}
