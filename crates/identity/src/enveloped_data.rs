//! CMS EnvelopedData for a single recipient (RFC 5652).
//!
//! A payload is encrypted under a fresh AES-GCM content-encryption key, and
//! that key is wrapped with RSA-OAEP (SHA-256, MGF1-SHA-256, default
//! P-source) for the holder of the recipient certificate. The recipient is
//! identified by the certificate's issuer name and serial number.
//!
//! Values are always wrapped in a `ContentInfo` on the wire, and exactly one
//! `KeyTransRecipientInfo` is accepted.

use der::asn1::{ObjectIdentifier, OctetString};
use der::{
    Any, Decode, DecodeValue, Encode, EncodeValue, FixedTag, Header, Length, Reader, Sequence,
    Tag, Writer,
};
use rand::{CryptoRng, RngCore};
use relaynet_crypto::{oids, SymmetricCipher, TAG_LENGTH};
use rsa::{Oaep, RsaPrivateKey};
use sha2::Sha256;
use x509_cert::name::Name;
use x509_cert::serial_number::SerialNumber;
use x509_cert::spki::AlgorithmIdentifierOwned;
use zeroize::Zeroizing;

use crate::error::{BoxedCause, EnvelopedDataError, EnvelopedDataResult};
use crate::pki::Certificate;

/// ICV length assumed when `GCMParameters` omits it (RFC 5084).
const DEFAULT_ICV_LENGTH: u8 = 12;

/// Parameters of `id-RSAES-OAEP` (RFC 4055). Absent fields take the RFC
/// defaults (SHA-1, MGF1-SHA-1, empty label).
#[derive(Clone, Debug, Default, Eq, PartialEq, Sequence)]
pub struct RsaOaepParams {
    #[asn1(context_specific = "0", tag_mode = "EXPLICIT", optional = "true")]
    pub hash_algorithm: Option<AlgorithmIdentifierOwned>,
    #[asn1(context_specific = "1", tag_mode = "EXPLICIT", optional = "true")]
    pub mask_gen_algorithm: Option<AlgorithmIdentifierOwned>,
    #[asn1(context_specific = "2", tag_mode = "EXPLICIT", optional = "true")]
    pub p_source_algorithm: Option<AlgorithmIdentifierOwned>,
}

impl RsaOaepParams {
    /// SHA-256 for both the hash and MGF1, with the default P-source.
    pub fn sha256() -> der::Result<Self> {
        Ok(Self {
            hash_algorithm: Some(sha256_algorithm()?),
            mask_gen_algorithm: Some(AlgorithmIdentifierOwned {
                oid: oids::MGF1,
                parameters: Some(to_any(&sha256_algorithm()?)?),
            }),
            p_source_algorithm: None,
        })
    }

    /// Whether these parameters select SHA-256 with the default P-source.
    pub fn is_sha256(&self) -> bool {
        let hash_is_sha256 = self
            .hash_algorithm
            .as_ref()
            .map_or(false, |algorithm| algorithm.oid == oids::SHA256);
        let mgf_is_sha256 = self.mask_gen_algorithm.as_ref().map_or(false, |algorithm| {
            algorithm.oid == oids::MGF1
                && algorithm
                    .parameters
                    .as_ref()
                    .and_then(|parameters| parameters.to_der().ok())
                    .and_then(|der| AlgorithmIdentifierOwned::from_der(&der).ok())
                    .map_or(false, |mgf_hash| mgf_hash.oid == oids::SHA256)
        });
        hash_is_sha256 && mgf_is_sha256 && self.p_source_algorithm.is_none()
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
struct GcmParameters {
    nonce: OctetString,
    icv_len: Option<u8>,
}

#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
struct ContentInfo {
    content_type: ObjectIdentifier,
    #[asn1(context_specific = "0", tag_mode = "EXPLICIT")]
    content: Any,
}

#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
struct EnvelopedDataContent {
    version: u8,
    recipient_infos: RecipientInfos,
    encrypted_content_info: EncryptedContentInfo,
}

#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
struct IssuerAndSerialNumber {
    issuer: Name,
    serial_number: SerialNumber,
}

#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
struct KeyTransRecipientInfo {
    version: u8,
    rid: IssuerAndSerialNumber,
    key_encryption_algorithm: AlgorithmIdentifierOwned,
    encrypted_key: OctetString,
}

#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
struct EncryptedContentInfo {
    content_type: ObjectIdentifier,
    content_encryption_algorithm: AlgorithmIdentifierOwned,
    #[asn1(context_specific = "0", tag_mode = "IMPLICIT", optional = "true")]
    encrypted_content: Option<OctetString>,
}

/// `SET OF RecipientInfo`, restricted to key transport recipients.
///
/// Entries are kept in the order they were read; counting them is left to
/// the caller so the error can say how many there were.
#[derive(Clone, Debug, Eq, PartialEq)]
struct RecipientInfos(Vec<KeyTransRecipientInfo>);

impl FixedTag for RecipientInfos {
    const TAG: Tag = Tag::Set;
}

impl<'a> DecodeValue<'a> for RecipientInfos {
    fn decode_value<R: Reader<'a>>(reader: &mut R, header: Header) -> der::Result<Self> {
        reader.read_nested(header.length, |reader| {
            let mut recipient_infos = Vec::new();
            while !reader.is_finished() {
                recipient_infos.push(KeyTransRecipientInfo::decode(reader)?);
            }
            Ok(Self(recipient_infos))
        })
    }
}

impl EncodeValue for RecipientInfos {
    fn value_len(&self) -> der::Result<Length> {
        self.0
            .iter()
            .try_fold(Length::ZERO, |length, info| length + info.encoded_len()?)
    }

    fn encode_value(&self, writer: &mut impl Writer) -> der::Result<()> {
        for info in &self.0 {
            info.encode(writer)?;
        }
        Ok(())
    }
}

/// Payload encrypted for exactly one recipient certificate.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EnvelopedData {
    version: u8,
    recipient: KeyTransRecipientInfo,
    encrypted_content_info: EncryptedContentInfo,
}

impl EnvelopedData {
    /// Encrypt `plaintext` for the holder of `recipient`'s private key.
    pub fn encrypt<R: CryptoRng + RngCore>(
        plaintext: &[u8],
        recipient: &Certificate,
        cipher: SymmetricCipher,
        rng: &mut R,
    ) -> EnvelopedDataResult<Self> {
        let recipient_key = recipient.subject_public_key().map_err(encryption_error)?;

        let content_key = cipher.generate_key(rng);
        let nonce = SymmetricCipher::generate_nonce(rng);
        let ciphertext = cipher
            .encrypt(&content_key, &nonce, plaintext)
            .map_err(encryption_error)?;
        let encrypted_key = recipient_key
            .encrypt(rng, Oaep::new::<Sha256>(), &content_key)
            .map_err(encryption_error)?;

        let gcm_parameters = GcmParameters {
            nonce: OctetString::new(nonce.to_vec())?,
            icv_len: Some(TAG_LENGTH as u8),
        };
        let enveloped_data = Self {
            version: 0,
            recipient: KeyTransRecipientInfo {
                version: 0,
                rid: IssuerAndSerialNumber {
                    issuer: recipient.issuer().clone(),
                    serial_number: recipient.serial_number().clone(),
                },
                key_encryption_algorithm: AlgorithmIdentifierOwned {
                    oid: oids::RSAES_OAEP,
                    parameters: Some(to_any(&RsaOaepParams::sha256()?)?),
                },
                encrypted_key: OctetString::new(encrypted_key)?,
            },
            encrypted_content_info: EncryptedContentInfo {
                content_type: oids::CMS_DATA,
                content_encryption_algorithm: AlgorithmIdentifierOwned {
                    oid: cipher.oid(),
                    parameters: Some(to_any(&gcm_parameters)?),
                },
                encrypted_content: Some(OctetString::new(ciphertext)?),
            },
        };

        tracing::debug!(
            cipher = %cipher,
            plaintext_length = plaintext.len(),
            "encrypted EnvelopedData"
        );
        Ok(enveloped_data)
    }

    /// Recover the plaintext with the recipient's private key.
    ///
    /// Any failure, including a wrong key or a failed tag check, is reported
    /// as [`EnvelopedDataError::Decryption`]. No plaintext is returned unless
    /// it authenticated.
    pub fn decrypt(&self, private_key: &RsaPrivateKey) -> EnvelopedDataResult<Vec<u8>> {
        self.try_decrypt(private_key).map_err(|cause| {
            tracing::debug!(error = %cause, "could not decrypt EnvelopedData");
            EnvelopedDataError::Decryption(cause)
        })
    }

    /// DER-encode as a `ContentInfo`.
    pub fn serialize(&self) -> EnvelopedDataResult<Vec<u8>> {
        let content = EnvelopedDataContent {
            version: self.version,
            recipient_infos: RecipientInfos(vec![self.recipient.clone()]),
            encrypted_content_info: self.encrypted_content_info.clone(),
        };
        let content_info = ContentInfo {
            content_type: oids::CMS_ENVELOPED_DATA,
            content: to_any(&content)?,
        };
        Ok(content_info.to_der()?)
    }

    /// Parse a DER-encoded `ContentInfo` wrapping EnvelopedData.
    pub fn deserialize(serialization: &[u8]) -> EnvelopedDataResult<Self> {
        let content_info =
            ContentInfo::from_der(serialization).map_err(EnvelopedDataError::Malformed)?;
        if content_info.content_type != oids::CMS_ENVELOPED_DATA {
            return Err(EnvelopedDataError::UnexpectedContentType(
                content_info.content_type,
            ));
        }

        let content = content_info
            .content
            .to_der()
            .and_then(|der| EnvelopedDataContent::from_der(&der))
            .map_err(EnvelopedDataError::Malformed)?;
        let [recipient]: [KeyTransRecipientInfo; 1] = content
            .recipient_infos
            .0
            .try_into()
            .map_err(|infos: Vec<_>| EnvelopedDataError::InvalidRecipientCount(infos.len()))?;

        Ok(Self {
            version: content.version,
            recipient,
            encrypted_content_info: content.encrypted_content_info,
        })
    }

    /// Issuer name of the recipient certificate.
    pub fn recipient_issuer(&self) -> &Name {
        &self.recipient.rid.issuer
    }

    /// Serial number of the recipient certificate.
    pub fn recipient_serial_number(&self) -> &SerialNumber {
        &self.recipient.rid.serial_number
    }

    pub fn key_encryption_algorithm(&self) -> &ObjectIdentifier {
        &self.recipient.key_encryption_algorithm.oid
    }

    /// OAEP parameters of the key encryption algorithm.
    pub fn key_encryption_parameters(&self) -> EnvelopedDataResult<RsaOaepParams> {
        match &self.recipient.key_encryption_algorithm.parameters {
            Some(parameters) => parameters
                .to_der()
                .and_then(|der| RsaOaepParams::from_der(&der))
                .map_err(EnvelopedDataError::Malformed),
            None => Ok(RsaOaepParams::default()),
        }
    }

    /// Cipher the content was encrypted with.
    pub fn content_cipher(&self) -> EnvelopedDataResult<SymmetricCipher> {
        let oid = &self
            .encrypted_content_info
            .content_encryption_algorithm
            .oid;
        SymmetricCipher::from_oid(oid).map_err(|_| EnvelopedDataError::UnsupportedAlgorithm(*oid))
    }

    fn try_decrypt(&self, private_key: &RsaPrivateKey) -> Result<Vec<u8>, BoxedCause> {
        let key_encryption_algorithm = self.key_encryption_algorithm();
        if *key_encryption_algorithm != oids::RSAES_OAEP {
            return Err(Box::new(EnvelopedDataError::UnsupportedAlgorithm(
                *key_encryption_algorithm,
            )));
        }
        if !self.key_encryption_parameters()?.is_sha256() {
            return Err("Only SHA-256 is supported in RSA-OAEP parameters".into());
        }
        let cipher = self.content_cipher()?;
        let gcm_parameters = self.gcm_parameters()?;
        if gcm_parameters.icv_len.unwrap_or(DEFAULT_ICV_LENGTH) as usize != TAG_LENGTH {
            return Err("Only 16-octet GCM authentication tags are supported".into());
        }
        let ciphertext = self
            .encrypted_content_info
            .encrypted_content
            .as_ref()
            .ok_or("EnvelopedData has no encrypted content")?;

        let content_key = Zeroizing::new(
            private_key.decrypt(Oaep::new::<Sha256>(), self.recipient.encrypted_key.as_bytes())?,
        );
        Ok(cipher.decrypt(
            &content_key,
            gcm_parameters.nonce.as_bytes(),
            ciphertext.as_bytes(),
        )?)
    }

    fn gcm_parameters(&self) -> EnvelopedDataResult<GcmParameters> {
        let parameters = self
            .encrypted_content_info
            .content_encryption_algorithm
            .parameters
            .as_ref()
            .ok_or_else(|| EnvelopedDataError::Malformed(Tag::Sequence.value_error()))?;
        parameters
            .to_der()
            .and_then(|der| GcmParameters::from_der(&der))
            .map_err(EnvelopedDataError::Malformed)
    }
}

fn sha256_algorithm() -> der::Result<AlgorithmIdentifierOwned> {
    Ok(AlgorithmIdentifierOwned {
        oid: oids::SHA256,
        parameters: Some(Any::new(Tag::Null, Vec::new())?),
    })
}

fn to_any<T: Encode>(value: &T) -> der::Result<Any> {
    Any::from_der(&value.to_der()?)
}

fn encryption_error<E: std::error::Error + Send + Sync + 'static>(error: E) -> EnvelopedDataError {
    EnvelopedDataError::Encryption(Box::new(error))
}
