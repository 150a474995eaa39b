//! RSA key management and SHA-256 digests.
//!
//! Node keys are RSA with a modulus of at least 2048 bits. Public keys are
//! exchanged as DER-encoded SubjectPublicKeyInfo structures and private keys
//! as PKCS#8; key identifiers are SHA-256 digests of the former.

use rand::{CryptoRng, RngCore};
use relaynet_core::config::{KeyConfig, MIN_RSA_MODULUS_BITS};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::error::{CryptoError, CryptoResult};

/// Length of a SHA-256 digest in bytes.
pub const SHA256_LENGTH: usize = 32;

/// RSA key pair owned by a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsaKeyPair {
    pub private_key: RsaPrivateKey,
    pub public_key: RsaPublicKey,
}

impl RsaKeyPair {
    /// Generate a key pair with the given modulus length.
    pub fn generate<R: CryptoRng + RngCore>(
        modulus_bits: usize,
        rng: &mut R,
    ) -> CryptoResult<Self> {
        if modulus_bits < MIN_RSA_MODULUS_BITS {
            return Err(CryptoError::ModulusTooSmall {
                min: MIN_RSA_MODULUS_BITS,
                actual: modulus_bits,
            });
        }

        let private_key =
            RsaPrivateKey::new(rng, modulus_bits).map_err(CryptoError::KeyGeneration)?;
        let public_key = private_key.to_public_key();
        tracing::debug!(modulus_bits, "generated RSA key pair");

        Ok(Self {
            private_key,
            public_key,
        })
    }

    /// Generate a key pair sized according to `config`.
    pub fn generate_with_config<R: CryptoRng + RngCore>(
        config: &KeyConfig,
        rng: &mut R,
    ) -> CryptoResult<Self> {
        Self::generate(config.rsa_modulus_bits, rng)
    }

    /// Modulus length in bits.
    pub fn modulus_bits(&self) -> usize {
        self.public_key.size() * 8
    }
}

/// Generate an RSA key pair of `modulus_bits` bits (at least 2048).
pub fn generate_rsa_key_pair<R: CryptoRng + RngCore>(
    modulus_bits: usize,
    rng: &mut R,
) -> CryptoResult<RsaKeyPair> {
    RsaKeyPair::generate(modulus_bits, rng)
}

/// SHA-256 digest of `data`.
pub fn sha256_digest(data: &[u8]) -> [u8; SHA256_LENGTH] {
    let digest = Sha256::digest(data);
    let mut output = [0u8; SHA256_LENGTH];
    output.copy_from_slice(&digest);
    output
}

/// DER-encode a public key as SubjectPublicKeyInfo.
pub fn public_key_to_der(public_key: &RsaPublicKey) -> CryptoResult<Vec<u8>> {
    public_key
        .to_public_key_der()
        .map(|document| document.as_bytes().to_vec())
        .map_err(|e| CryptoError::KeyEncoding(e.to_string()))
}

/// Parse a DER-encoded SubjectPublicKeyInfo holding an RSA key.
pub fn public_key_from_der(der: &[u8]) -> CryptoResult<RsaPublicKey> {
    RsaPublicKey::from_public_key_der(der).map_err(|e| CryptoError::KeyDecoding(e.to_string()))
}

/// SHA-256 digest of the DER-encoded SubjectPublicKeyInfo.
///
/// This is the key identifier used in certificates.
pub fn public_key_digest(public_key: &RsaPublicKey) -> CryptoResult<[u8; SHA256_LENGTH]> {
    Ok(sha256_digest(&public_key_to_der(public_key)?))
}

/// PKCS#8-encode a private key. The buffer is wiped on drop.
pub fn private_key_to_der(private_key: &RsaPrivateKey) -> CryptoResult<Zeroizing<Vec<u8>>> {
    private_key
        .to_pkcs8_der()
        .map(|document| Zeroizing::new(document.as_bytes().to_vec()))
        .map_err(|e| CryptoError::KeyEncoding(e.to_string()))
}

/// Parse a PKCS#8-encoded RSA private key.
pub fn private_key_from_der(der: &[u8]) -> CryptoResult<RsaPrivateKey> {
    RsaPrivateKey::from_pkcs8_der(der).map_err(|e| CryptoError::KeyDecoding(e.to_string()))
}
