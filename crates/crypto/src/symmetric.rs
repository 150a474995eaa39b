//! # Symmetric Encryption
//!
//! AES-GCM content encryption for enveloped payloads. The cipher is
//! selectable; AES-128-GCM is the default. Ciphertexts carry the 16-byte
//! authentication tag appended, and a fresh 12-byte nonce must be used for
//! every encryption under a given key.

use std::fmt;
use std::str::FromStr;

use aes_gcm::aead::consts::U12;
use aes_gcm::aead::{Aead, KeyInit, Nonce};
use aes_gcm::aes::Aes192;
use aes_gcm::{Aes128Gcm, Aes256Gcm, AesGcm};
use der::asn1::ObjectIdentifier;
use rand::{CryptoRng, RngCore};
use relaynet_core::EncryptionConfig;
use zeroize::Zeroizing;

use crate::error::{CryptoError, CryptoResult};
use crate::oids;

type Aes192Gcm = AesGcm<Aes192, U12>;

/// GCM nonce length in bytes.
pub const NONCE_LENGTH: usize = 12;

/// GCM authentication tag length in bytes.
pub const TAG_LENGTH: usize = 16;

/// Content-encryption cipher selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SymmetricCipher {
    #[default]
    Aes128Gcm,
    Aes192Gcm,
    Aes256Gcm,
}

impl SymmetricCipher {
    pub const ALL: [SymmetricCipher; 3] = [Self::Aes128Gcm, Self::Aes192Gcm, Self::Aes256Gcm];

    /// Key length in bytes.
    pub fn key_length(self) -> usize {
        match self {
            Self::Aes128Gcm => 16,
            Self::Aes192Gcm => 24,
            Self::Aes256Gcm => 32,
        }
    }

    /// Algorithm identifier (RFC 5084).
    pub fn oid(self) -> ObjectIdentifier {
        match self {
            Self::Aes128Gcm => oids::AES128_GCM,
            Self::Aes192Gcm => oids::AES192_GCM,
            Self::Aes256Gcm => oids::AES256_GCM,
        }
    }

    pub fn from_oid(oid: &ObjectIdentifier) -> CryptoResult<Self> {
        Self::ALL
            .into_iter()
            .find(|cipher| cipher.oid() == *oid)
            .ok_or_else(|| CryptoError::UnsupportedCipher(oid.to_string()))
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Aes128Gcm => "aes-128-gcm",
            Self::Aes192Gcm => "aes-192-gcm",
            Self::Aes256Gcm => "aes-256-gcm",
        }
    }

    /// The cipher named in the configuration.
    pub fn from_config(config: &EncryptionConfig) -> CryptoResult<Self> {
        config.default_cipher.parse()
    }

    /// Generate a random key of the right size for this cipher.
    pub fn generate_key<R: CryptoRng + RngCore>(self, rng: &mut R) -> Zeroizing<Vec<u8>> {
        let mut key = Zeroizing::new(vec![0u8; self.key_length()]);
        rng.fill_bytes(&mut key);
        key
    }

    /// Generate a random nonce.
    pub fn generate_nonce<R: CryptoRng + RngCore>(rng: &mut R) -> [u8; NONCE_LENGTH] {
        let mut nonce = [0u8; NONCE_LENGTH];
        rng.fill_bytes(&mut nonce);
        nonce
    }

    /// Encrypt `plaintext`, returning the ciphertext with the tag appended.
    pub fn encrypt(self, key: &[u8], nonce: &[u8], plaintext: &[u8]) -> CryptoResult<Vec<u8>> {
        self.check_lengths(key, nonce)?;
        match self {
            Self::Aes128Gcm => seal::<Aes128Gcm>(key, nonce, plaintext),
            Self::Aes192Gcm => seal::<Aes192Gcm>(key, nonce, plaintext),
            Self::Aes256Gcm => seal::<Aes256Gcm>(key, nonce, plaintext),
        }
    }

    /// Decrypt and authenticate `ciphertext`.
    ///
    /// Nothing is returned unless the tag verifies.
    pub fn decrypt(self, key: &[u8], nonce: &[u8], ciphertext: &[u8]) -> CryptoResult<Vec<u8>> {
        self.check_lengths(key, nonce)?;
        match self {
            Self::Aes128Gcm => open::<Aes128Gcm>(key, nonce, ciphertext),
            Self::Aes192Gcm => open::<Aes192Gcm>(key, nonce, ciphertext),
            Self::Aes256Gcm => open::<Aes256Gcm>(key, nonce, ciphertext),
        }
    }

    fn check_lengths(self, key: &[u8], nonce: &[u8]) -> CryptoResult<()> {
        if key.len() != self.key_length() {
            return Err(CryptoError::InvalidKeyLength {
                expected: self.key_length(),
                actual: key.len(),
            });
        }
        if nonce.len() != NONCE_LENGTH {
            return Err(CryptoError::InvalidNonceLength {
                expected: NONCE_LENGTH,
                actual: nonce.len(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for SymmetricCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SymmetricCipher {
    type Err = CryptoError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|cipher| cipher.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| CryptoError::UnsupportedCipher(name.to_string()))
    }
}

fn seal<C: Aead + KeyInit>(key: &[u8], nonce: &[u8], plaintext: &[u8]) -> CryptoResult<Vec<u8>> {
    let cipher = C::new_from_slice(key).map_err(|_| CryptoError::Encryption)?;
    cipher
        .encrypt(Nonce::<C>::from_slice(nonce), plaintext)
        .map_err(|_| CryptoError::Encryption)
}

fn open<C: Aead + KeyInit>(key: &[u8], nonce: &[u8], ciphertext: &[u8]) -> CryptoResult<Vec<u8>> {
    let cipher = C::new_from_slice(key).map_err(|_| CryptoError::Decryption)?;
    cipher
        .decrypt(Nonce::<C>::from_slice(nonce), ciphertext)
        .map_err(|_| CryptoError::Decryption)
}
