//! Public Key Infrastructure (PKI) for Relaynet nodes.
//!
//! Nodes identify each other with X.509 v3 certificates whose subject is a
//! single CommonName. Every certificate carries three extensions:
//!
//! - **Basic constraints** (critical): CA flag and path length constraint
//! - **Subject key identifier**: SHA-256 of the subject's SubjectPublicKeyInfo
//! - **Authority key identifier**: SHA-256 of the issuer's SubjectPublicKeyInfo,
//!   or of the subject's own key when the certificate is self-issued
//!
//! Certificates are immutable values. Equality and hashing use the DER
//! encoding, so two certificates with the same bytes are the same certificate.

use std::hash::{Hash, Hasher};
use std::time::Duration;

use chrono::{DateTime, Datelike, NaiveTime, TimeZone, Utc};
use der::asn1::{BitString, GeneralizedTime, OctetString, SetOfVec, UtcTime};
use der::{Any, Decode, Encode, Tag, Tagged};
use rand::{CryptoRng, RngCore};
use relaynet_crypto::{
    oids, public_key_digest, public_key_from_der, public_key_to_der, sha256_digest,
};
use rsa::pkcs1v15::{Signature, SigningKey, VerifyingKey};
use rsa::signature::{SignatureEncoding, Signer, Verifier};
use rsa::{RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;
use x509_cert::attr::AttributeTypeAndValue;
use x509_cert::certificate::{TbsCertificate, Version};
use x509_cert::ext::pkix::{AuthorityKeyIdentifier, BasicConstraints, SubjectKeyIdentifier};
use x509_cert::ext::Extension;
use x509_cert::name::{Name, RdnSequence, RelativeDistinguishedName};
use x509_cert::serial_number::SerialNumber;
use x509_cert::spki::{AlgorithmIdentifierOwned, SubjectPublicKeyInfoOwned};
use x509_cert::time::{Time, Validity};

use crate::error::{CertificateError, CertificateResult};

/// Largest accepted `pathLenConstraint`.
pub const MAX_PATH_LENGTH_CONSTRAINT: u8 = 2;

/// Serial numbers are 64-bit positive integers.
const SERIAL_NUMBER_LENGTH: usize = 8;

/// Parameters for issuing a certificate.
///
/// Only the common name, the keys and the end date are required. The start
/// date defaults to the time of issuance and the certificate defaults to a
/// self-issued, non-CA one.
#[derive(Clone)]
pub struct CertificateRequest<'a> {
    common_name: String,
    subject_public_key: &'a RsaPublicKey,
    issuer_private_key: &'a RsaPrivateKey,
    validity_end_date: DateTime<Utc>,
    validity_start_date: Option<DateTime<Utc>>,
    issuer_certificate: Option<&'a Certificate>,
    is_ca: bool,
    path_len_constraint: u8,
}

impl<'a> CertificateRequest<'a> {
    /// Create a request for a self-issued, non-CA certificate.
    pub fn new(
        common_name: impl Into<String>,
        subject_public_key: &'a RsaPublicKey,
        issuer_private_key: &'a RsaPrivateKey,
        validity_end_date: DateTime<Utc>,
    ) -> Self {
        Self {
            common_name: common_name.into(),
            subject_public_key,
            issuer_private_key,
            validity_end_date,
            validity_start_date: None,
            issuer_certificate: None,
            is_ca: false,
            path_len_constraint: 0,
        }
    }

    /// Set the start of the validity period.
    pub fn validity_start_date(mut self, date: DateTime<Utc>) -> Self {
        self.validity_start_date = Some(date);
        self
    }

    /// Issue under `issuer` instead of self-issuing.
    pub fn issuer_certificate(mut self, issuer: &'a Certificate) -> Self {
        self.issuer_certificate = Some(issuer);
        self
    }

    /// Mark the subject as a certificate authority.
    pub fn ca(mut self, is_ca: bool) -> Self {
        self.is_ca = is_ca;
        self
    }

    /// Maximum number of CA certificates allowed below this one.
    pub fn path_len_constraint(mut self, path_len_constraint: u8) -> Self {
        self.path_len_constraint = path_len_constraint;
        self
    }
}

/// X.509 v3 certificate for a Relaynet node.
#[derive(Debug, Clone)]
pub struct Certificate {
    inner: x509_cert::Certificate,
    der: Vec<u8>,
    subject_key_identifier: Option<Vec<u8>>,
    authority_key_identifier: Option<Vec<u8>>,
}

impl Certificate {
    /// Issue a new certificate.
    ///
    /// The request is validated before anything is signed. Both ends of the
    /// validity period are truncated to 00:00:00 UTC, and the end date must
    /// still be later than the start date after truncation.
    pub fn issue<R: CryptoRng + RngCore>(
        request: CertificateRequest<'_>,
        rng: &mut R,
    ) -> CertificateResult<Self> {
        if request.common_name.is_empty() {
            return Err(CertificateError::EmptyCommonName);
        }

        let start_date = truncate_to_day(request.validity_start_date.unwrap_or_else(Utc::now));
        let end_date = truncate_to_day(request.validity_end_date);
        if end_date <= start_date {
            return Err(CertificateError::InvalidValidityPeriod);
        }

        if request.path_len_constraint > MAX_PATH_LENGTH_CONSTRAINT {
            return Err(CertificateError::PathLenConstraintOutOfRange(
                request.path_len_constraint,
            ));
        }
        if request.path_len_constraint > 0 && !request.is_ca {
            return Err(CertificateError::NonCaWithPathLenConstraint(
                request.path_len_constraint,
            ));
        }

        if let Some(issuer) = request.issuer_certificate {
            match issuer.basic_constraints() {
                None => return Err(CertificateError::IssuerMissingBasicConstraints),
                Some(constraints) if !constraints.ca => return Err(CertificateError::IssuerNotCa),
                Some(_) => {}
            }
        }

        let subject = build_name(&request.common_name)?;
        let issuer = match request.issuer_certificate {
            Some(issuer_certificate) => issuer_certificate.subject().clone(),
            None => subject.clone(),
        };

        let subject_public_key_der = public_key_to_der(request.subject_public_key)?;
        let subject_key_identifier = sha256_digest(&subject_public_key_der);
        let authority_key_identifier = match request.issuer_certificate {
            Some(issuer_certificate) => sha256_digest(
                &issuer_certificate
                    .inner
                    .tbs_certificate
                    .subject_public_key_info
                    .to_der()?,
            ),
            None => subject_key_identifier,
        };

        let basic_constraints = BasicConstraints {
            ca: request.is_ca,
            path_len_constraint: request.is_ca.then_some(request.path_len_constraint),
        };
        let extensions = vec![
            build_extension(oids::BASIC_CONSTRAINTS, true, &basic_constraints)?,
            build_extension(
                oids::SUBJECT_KEY_IDENTIFIER,
                false,
                &SubjectKeyIdentifier(OctetString::new(subject_key_identifier.to_vec())?),
            )?,
            build_extension(
                oids::AUTHORITY_KEY_IDENTIFIER,
                false,
                &AuthorityKeyIdentifier {
                    key_identifier: Some(OctetString::new(authority_key_identifier.to_vec())?),
                    authority_cert_issuer: None,
                    authority_cert_serial_number: None,
                },
            )?,
        ];

        let tbs_certificate = TbsCertificate {
            version: Version::V3,
            serial_number: generate_serial_number(rng)?,
            signature: signature_algorithm()?,
            issuer,
            validity: Validity {
                not_before: to_certificate_time(start_date)?,
                not_after: to_certificate_time(end_date)?,
            },
            subject,
            subject_public_key_info: SubjectPublicKeyInfoOwned::from_der(&subject_public_key_der)?,
            issuer_unique_id: None,
            subject_unique_id: None,
            extensions: Some(extensions),
        };

        let signing_key = SigningKey::<Sha256>::new(request.issuer_private_key.clone());
        let signature = signing_key
            .try_sign(&tbs_certificate.to_der()?)
            .map_err(|e| CertificateError::Signing(e.to_string()))?;

        let certificate = Self::from_inner(x509_cert::Certificate {
            tbs_certificate,
            signature_algorithm: signature_algorithm()?,
            signature: BitString::from_bytes(&signature.to_bytes())?,
        })?;

        tracing::debug!(
            common_name = %request.common_name,
            is_ca = request.is_ca,
            path_len_constraint = request.path_len_constraint,
            self_issued = request.issuer_certificate.is_none(),
            "issued certificate"
        );

        Ok(certificate)
    }

    /// Parse a DER-encoded X.509 v3 certificate.
    pub fn deserialize(serialization: &[u8]) -> CertificateResult<Self> {
        let inner = x509_cert::Certificate::from_der(serialization)
            .map_err(|e| CertificateError::Malformed { source: Some(e) })?;
        if inner.tbs_certificate.version != Version::V3 {
            return Err(CertificateError::Malformed { source: None });
        }

        Self::from_inner(inner).map_err(|e| match e {
            CertificateError::Encoding(source) => CertificateError::Malformed {
                source: Some(source),
            },
            other => other,
        })
    }

    /// DER encoding of the certificate.
    pub fn serialize(&self) -> Vec<u8> {
        self.der.clone()
    }

    /// Borrow the DER encoding without copying it.
    pub fn as_der(&self) -> &[u8] {
        &self.der
    }

    /// Subject CommonName.
    pub fn common_name(&self) -> Option<String> {
        get_common_name(self.subject())
    }

    /// Issuer CommonName.
    pub fn issuer_common_name(&self) -> Option<String> {
        get_common_name(self.issuer())
    }

    pub fn subject(&self) -> &Name {
        &self.inner.tbs_certificate.subject
    }

    /// Issuer distinguished name.
    pub fn issuer(&self) -> &Name {
        &self.inner.tbs_certificate.issuer
    }

    pub fn serial_number(&self) -> &SerialNumber {
        &self.inner.tbs_certificate.serial_number
    }

    /// The subject's RSA public key.
    pub fn subject_public_key(&self) -> CertificateResult<RsaPublicKey> {
        let spki_der = self.inner.tbs_certificate.subject_public_key_info.to_der()?;
        Ok(public_key_from_der(&spki_der)?)
    }

    /// Start of the validity period.
    pub fn start_date(&self) -> DateTime<Utc> {
        self.inner
            .tbs_certificate
            .validity
            .not_before
            .to_system_time()
            .into()
    }

    /// End of the validity period.
    pub fn expiry_date(&self) -> DateTime<Utc> {
        self.inner
            .tbs_certificate
            .validity
            .not_after
            .to_system_time()
            .into()
    }

    pub fn is_ca(&self) -> bool {
        self.basic_constraints()
            .map_or(false, |constraints| constraints.ca)
    }

    pub fn path_len_constraint(&self) -> u8 {
        self.basic_constraints()
            .and_then(|constraints| constraints.path_len_constraint)
            .unwrap_or(0)
    }

    /// SHA-256 of the subject's SubjectPublicKeyInfo, as stored in the certificate.
    pub fn subject_key_identifier(&self) -> Option<&[u8]> {
        self.subject_key_identifier.as_deref()
    }

    /// SHA-256 of the issuer's SubjectPublicKeyInfo, as stored in the certificate.
    pub fn authority_key_identifier(&self) -> Option<&[u8]> {
        self.authority_key_identifier.as_deref()
    }

    /// Check that this certificate was issued by `issuer`.
    ///
    /// The issuer name and key identifiers must line up and the signature must
    /// verify with the issuer's public key. Validity periods and revocation
    /// are not checked.
    pub fn verify_issued_by(&self, issuer: &Certificate) -> CertificateResult<()> {
        if self.issuer() != issuer.subject() {
            return Err(CertificateError::IssuerMismatch);
        }

        let issuer_key = issuer.subject_public_key()?;
        if self.authority_key_identifier() != Some(&public_key_digest(&issuer_key)?[..]) {
            return Err(CertificateError::IssuerMismatch);
        }

        if self.inner.signature_algorithm.oid != oids::SHA256_WITH_RSA_ENCRYPTION {
            return Err(CertificateError::InvalidSignature);
        }
        let signature = Signature::try_from(self.inner.signature.raw_bytes())
            .map_err(|_| CertificateError::InvalidSignature)?;
        VerifyingKey::<Sha256>::new(issuer_key)
            .verify(&self.inner.tbs_certificate.to_der()?, &signature)
            .map_err(|_| CertificateError::InvalidSignature)
    }

    fn from_inner(inner: x509_cert::Certificate) -> CertificateResult<Self> {
        let der = inner.to_der()?;

        let mut subject_key_identifier = None;
        let mut authority_key_identifier = None;
        for extension in inner.tbs_certificate.extensions.iter().flatten() {
            if extension.extn_id == oids::SUBJECT_KEY_IDENTIFIER {
                let ski = SubjectKeyIdentifier::from_der(extension.extn_value.as_bytes())?;
                subject_key_identifier = Some(ski.0.as_bytes().to_vec());
            } else if extension.extn_id == oids::AUTHORITY_KEY_IDENTIFIER {
                let aki = AuthorityKeyIdentifier::from_der(extension.extn_value.as_bytes())?;
                authority_key_identifier = aki.key_identifier.map(|id| id.as_bytes().to_vec());
            }
        }

        Ok(Self {
            inner,
            der,
            subject_key_identifier,
            authority_key_identifier,
        })
    }

    fn basic_constraints(&self) -> Option<BasicConstraints> {
        self.inner
            .tbs_certificate
            .extensions
            .iter()
            .flatten()
            .find(|extension| extension.extn_id == oids::BASIC_CONSTRAINTS)
            .and_then(|extension| BasicConstraints::from_der(extension.extn_value.as_bytes()).ok())
    }
}

impl PartialEq for Certificate {
    fn eq(&self, other: &Self) -> bool {
        self.der == other.der
    }
}

impl Eq for Certificate {}

impl Hash for Certificate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.der.hash(state);
    }
}

fn build_name(common_name: &str) -> CertificateResult<Name> {
    let attribute = AttributeTypeAndValue {
        oid: oids::COMMON_NAME,
        value: Any::new(Tag::Utf8String, common_name.as_bytes().to_vec())?,
    };
    Ok(RdnSequence(vec![RelativeDistinguishedName(
        SetOfVec::try_from(vec![attribute])?,
    )]))
}

fn get_common_name(name: &Name) -> Option<String> {
    name.0
        .iter()
        .flat_map(|rdn| rdn.0.iter())
        .find(|attribute| attribute.oid == oids::COMMON_NAME)
        .and_then(|attribute| match attribute.value.tag() {
            Tag::Utf8String | Tag::PrintableString | Tag::Ia5String => {
                std::str::from_utf8(attribute.value.value())
                    .ok()
                    .map(str::to_owned)
            }
            _ => None,
        })
}

fn build_extension<T: Encode>(
    oid: der::asn1::ObjectIdentifier,
    critical: bool,
    value: &T,
) -> CertificateResult<Extension> {
    Ok(Extension {
        extn_id: oid,
        critical,
        extn_value: OctetString::new(value.to_der()?)?,
    })
}

/// sha256WithRSAEncryption with explicit NULL parameters (RFC 4055).
fn signature_algorithm() -> CertificateResult<AlgorithmIdentifierOwned> {
    Ok(AlgorithmIdentifierOwned {
        oid: oids::SHA256_WITH_RSA_ENCRYPTION,
        parameters: Some(Any::new(Tag::Null, Vec::new())?),
    })
}

fn generate_serial_number<R: CryptoRng + RngCore>(rng: &mut R) -> CertificateResult<SerialNumber> {
    let mut bytes = [0u8; SERIAL_NUMBER_LENGTH];
    rng.fill_bytes(&mut bytes);
    // Clear the sign bit and avoid a leading zero octet so the INTEGER stays
    // positive and minimally encoded.
    bytes[0] &= 0x7f;
    if bytes[0] == 0 {
        bytes[0] = 0x01;
    }
    Ok(SerialNumber::new(&bytes)?)
}

fn truncate_to_day(date: DateTime<Utc>) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.date_naive().and_time(NaiveTime::MIN))
}

/// RFC 5280: UTCTime through 2049, GeneralizedTime from 2050 onwards.
fn to_certificate_time(date: DateTime<Utc>) -> CertificateResult<Time> {
    let seconds =
        u64::try_from(date.timestamp()).map_err(|_| CertificateError::UnrepresentableDate(date))?;
    let since_epoch = Duration::from_secs(seconds);

    let time = if date.year() < 2050 {
        Time::UtcTime(UtcTime::from_unix_duration(since_epoch)?)
    } else {
        Time::GeneralTime(GeneralizedTime::from_unix_duration(since_epoch)?)
    };
    Ok(time)
}
