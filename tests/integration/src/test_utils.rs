//! Test utilities for cross-crate integration tests

use chrono::{DateTime, TimeDelta, Utc};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use relaynet_crypto::RsaKeyPair;
use relaynet_identity::{Certificate, CertificateRequest};
use std::sync::OnceLock;

/// Number of distinct key pairs available to tests
const KEY_PAIR_COUNT: usize = 4;

/// Get a pre-generated 2048-bit key pair.
///
/// RSA key generation is slow, so the pool is generated once per test binary
/// from fixed seeds.
pub fn key_pair(index: usize) -> &'static RsaKeyPair {
    static KEY_PAIRS: OnceLock<Vec<RsaKeyPair>> = OnceLock::new();
    &KEY_PAIRS.get_or_init(|| {
        (0..KEY_PAIR_COUNT)
            .map(|seed| {
                RsaKeyPair::generate(2048, &mut ChaCha20Rng::seed_from_u64(1000 + seed as u64))
                    .unwrap()
            })
            .collect()
    })[index]
}

/// A date `days` days from now
pub fn days_from_now(days: i64) -> DateTime<Utc> {
    Utc::now() + TimeDelta::days(days)
}

/// Test fixture for a node holding a key pair and a certificate for it
pub struct TestNode {
    pub key_pair: &'static RsaKeyPair,
    pub certificate: Certificate,
}

impl TestNode {
    /// Create a node with a self-issued certificate
    pub fn self_issued(common_name: &str, key_index: usize, is_ca: bool, path_len: u8) -> Self {
        let key_pair = key_pair(key_index);
        let request = CertificateRequest::new(
            common_name,
            &key_pair.public_key,
            &key_pair.private_key,
            days_from_now(30),
        )
        .ca(is_ca)
        .path_len_constraint(path_len);
        let certificate = Certificate::issue(request, &mut rand::thread_rng()).unwrap();
        Self {
            key_pair,
            certificate,
        }
    }

    /// Create a node whose certificate is issued by `issuer`
    pub fn issued_by(
        issuer: &TestNode,
        common_name: &str,
        key_index: usize,
        is_ca: bool,
        path_len: u8,
    ) -> Self {
        let key_pair = key_pair(key_index);
        let request = CertificateRequest::new(
            common_name,
            &key_pair.public_key,
            &issuer.key_pair.private_key,
            days_from_now(7),
        )
        .issuer_certificate(&issuer.certificate)
        .ca(is_ca)
        .path_len_constraint(path_len);
        let certificate = Certificate::issue(request, &mut rand::thread_rng()).unwrap();
        Self {
            key_pair,
            certificate,
        }
    }
}
