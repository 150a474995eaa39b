//! End-to-End Chain of Trust Integration Tests
//!
//! This test suite validates certificate chains between Relaynet nodes:
//! 1. A root CA issues itself a certificate with a path length constraint
//! 2. The root issues a certificate to an intermediate CA
//! 3. The intermediate issues a certificate to an endpoint
//! 4. Each link is checked through its key identifiers and signature

use crate::test_utils::{days_from_now, key_pair, TestNode};
use relaynet_crypto::public_key_digest;
use relaynet_identity::{Certificate, CertificateError, CertificateRequest};

#[test]
fn test_end_to_end_chain_of_trust() {
    let _ = tracing_subscriber::fmt::try_init();

    tracing::info!("Step 1: Issuing root CA certificate");
    let root = TestNode::self_issued("root", 0, true, 2);
    assert!(root.certificate.is_ca());
    assert_eq!(
        root.certificate.authority_key_identifier(),
        root.certificate.subject_key_identifier()
    );

    tracing::info!("Step 2: Issuing intermediate CA certificate");
    let intermediate = TestNode::issued_by(&root, "intermediate", 1, true, 1);
    intermediate
        .certificate
        .verify_issued_by(&root.certificate)
        .unwrap();

    tracing::info!("Step 3: Issuing endpoint certificate");
    let endpoint = TestNode::issued_by(&intermediate, "endpoint", 2, false, 0);
    endpoint
        .certificate
        .verify_issued_by(&intermediate.certificate)
        .unwrap();
    assert_eq!(
        endpoint.certificate.issuer_common_name().as_deref(),
        Some("intermediate")
    );

    tracing::info!("Step 4: Checking that links cannot be skipped");
    assert!(matches!(
        endpoint.certificate.verify_issued_by(&root.certificate),
        Err(CertificateError::IssuerMismatch)
    ));
}

/// Authority key identifier of a certificate issued under a CA is the digest
/// of the CA's public key
#[test]
fn test_authority_key_identifier_links_to_issuer() {
    let ca = TestNode::self_issued("ca", 0, true, 1);
    let subordinate = TestNode::issued_by(&ca, "subordinate", 1, false, 0);

    let ca_key_digest = public_key_digest(&ca.key_pair.public_key).unwrap();
    let subordinate_key_digest = public_key_digest(&subordinate.key_pair.public_key).unwrap();

    assert_eq!(
        subordinate.certificate.authority_key_identifier(),
        Some(&ca_key_digest[..])
    );
    assert_eq!(
        subordinate.certificate.subject_key_identifier(),
        Some(&subordinate_key_digest[..])
    );
}

/// Issuing under a certificate that is not a CA must fail
#[test]
fn test_issuing_under_non_ca_fails() {
    let ca = TestNode::self_issued("ca", 0, true, 1);
    let leaf = TestNode::issued_by(&ca, "leaf", 1, false, 0);
    let subject = key_pair(2);

    let request = CertificateRequest::new(
        "grandchild",
        &subject.public_key,
        &leaf.key_pair.private_key,
        days_from_now(1),
    )
    .issuer_certificate(&leaf.certificate);
    let result = Certificate::issue(request, &mut rand::thread_rng());

    assert!(matches!(result, Err(CertificateError::IssuerNotCa)));
}

/// Certificates survive a trip over the wire unchanged
#[test]
fn test_chain_survives_serialization() {
    let ca = TestNode::self_issued("ca", 0, true, 1);
    let subordinate = TestNode::issued_by(&ca, "subordinate", 1, false, 0);

    let ca_certificate = Certificate::deserialize(&ca.certificate.serialize()).unwrap();
    let subordinate_certificate =
        Certificate::deserialize(&subordinate.certificate.serialize()).unwrap();

    assert_eq!(ca_certificate, ca.certificate);
    assert_eq!(ca_certificate.path_len_constraint(), 1);
    subordinate_certificate
        .verify_issued_by(&ca_certificate)
        .unwrap();
}
