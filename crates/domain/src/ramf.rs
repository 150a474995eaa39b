//! Relaynet Abstract Message Format (RAMF)
//!
//! Every message starts with a 10-octet format signature: the ASCII magic
//! constant `Relaynet` followed by the concrete message type and version.
//! The rest of the message is a DER sequence of five implicitly tagged
//! fields:
//!
//! | Tag | Field             | ASN.1 type      |
//! |-----|-------------------|-----------------|
//! | 0   | Recipient address | VisibleString   |
//! | 1   | Message id        | VisibleString   |
//! | 2   | Creation time     | GeneralizedTime |
//! | 3   | TTL (seconds)     | INTEGER         |
//! | 4   | Payload           | OCTET STRING    |
//!
//! Creation times are always UTC with second precision and a four-digit
//! year. They are written as `YYYYMMDDHHMMSS` with no zone designator; when
//! reading, a trailing `Z` is also accepted, but an explicit offset from UTC
//! is rejected.

use chrono::{DateTime, Datelike, NaiveDate, SubsecRound, TimeDelta, TimeZone, Utc};
use der::Any;
use relaynet_core::{asn1, RamfLimits};
use uuid::Uuid;

use crate::error::{RamfError, Result};

/// ASCII magic constant at the start of every message.
pub const MAGIC_CONSTANT: &[u8; 8] = b"Relaynet";

/// Length of the magic constant plus the type and version octets.
pub const FORMAT_SIGNATURE_LENGTH: usize = 10;

const FIELD_COUNT: usize = 5;

const CREATION_TIME_FORMAT: &str = "%Y%m%d%H%M%S";

/// Concrete message type and version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FormatSignature {
    pub concrete_type: u8,
    pub concrete_version: u8,
}

impl FormatSignature {
    pub const fn new(concrete_type: u8, concrete_version: u8) -> Self {
        Self {
            concrete_type,
            concrete_version,
        }
    }

    pub fn to_bytes(self) -> [u8; FORMAT_SIGNATURE_LENGTH] {
        let mut bytes = [0u8; FORMAT_SIGNATURE_LENGTH];
        bytes[..MAGIC_CONSTANT.len()].copy_from_slice(MAGIC_CONSTANT);
        bytes[8] = self.concrete_type;
        bytes[9] = self.concrete_version;
        bytes
    }

    /// Check that `serialization` starts with this signature.
    fn verify(self, serialization: &[u8]) -> Result<()> {
        if serialization.len() < FORMAT_SIGNATURE_LENGTH {
            return Err(RamfError::TooShort);
        }
        if &serialization[..MAGIC_CONSTANT.len()] != MAGIC_CONSTANT {
            return Err(RamfError::InvalidMagicConstant);
        }
        if serialization[8] != self.concrete_type {
            return Err(RamfError::UnexpectedType {
                expected: self.concrete_type,
                actual: serialization[8],
            });
        }
        if serialization[9] != self.concrete_version {
            return Err(RamfError::UnexpectedVersion {
                expected: self.concrete_version,
                actual: serialization[9],
            });
        }
        Ok(())
    }
}

/// The five fields shared by every RAMF message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageFields {
    pub recipient_address: String,
    pub message_id: String,
    pub creation_time: DateTime<Utc>,
    /// Time to live in seconds, counted from `creation_time`
    pub ttl: u32,
    pub payload: Vec<u8>,
}

impl MessageFields {
    /// Fields for a message created now, with a random UUID v4 as its id.
    pub fn new(recipient_address: impl Into<String>, ttl: u32, payload: Vec<u8>) -> Self {
        Self {
            recipient_address: recipient_address.into(),
            message_id: Uuid::new_v4().to_string(),
            creation_time: Utc::now().trunc_subsecs(0),
            ttl,
            payload,
        }
    }

    /// When the message stops being valid.
    pub fn expiry_time(&self) -> DateTime<Utc> {
        self.creation_time
            .checked_add_signed(TimeDelta::seconds(i64::from(self.ttl)))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Reject messages created after `now` or already expired at `now`.
    pub fn validate_timing(&self, now: DateTime<Utc>) -> Result<()> {
        if now < self.creation_time {
            return Err(RamfError::CreatedInFuture(self.creation_time));
        }
        let expiry_time = self.expiry_time();
        if expiry_time < now {
            return Err(RamfError::Expired(expiry_time));
        }
        Ok(())
    }

    /// Check every field against `limits`.
    pub fn validate(&self, limits: &RamfLimits) -> Result<()> {
        validate_visible_string("Recipient address", &self.recipient_address)?;
        if self.recipient_address.len() > limits.max_recipient_address_length {
            return Err(RamfError::RecipientAddressTooLong {
                max: limits.max_recipient_address_length,
                actual: self.recipient_address.len(),
            });
        }

        validate_visible_string("Message id", &self.message_id)?;
        if self.message_id.len() > limits.max_message_id_length {
            return Err(RamfError::MessageIdTooLong {
                max: limits.max_message_id_length,
                actual: self.message_id.len(),
            });
        }

        if !(0..=9999).contains(&self.creation_time.year()) {
            return Err(RamfError::CreationTimeOutOfRange(self.creation_time));
        }

        if self.ttl > limits.max_ttl {
            return Err(RamfError::TtlTooLong {
                max: limits.max_ttl,
                actual: u64::from(self.ttl),
            });
        }

        if self.payload.len() > limits.max_payload_length {
            return Err(RamfError::PayloadTooLarge {
                max: limits.max_payload_length,
                actual: self.payload.len(),
            });
        }

        Ok(())
    }
}

/// A RAMF message: a format signature plus validated fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RamfMessage {
    format_signature: FormatSignature,
    fields: MessageFields,
}

impl RamfMessage {
    /// Build a message, enforcing the default limits.
    pub fn new(format_signature: FormatSignature, fields: MessageFields) -> Result<Self> {
        Self::with_limits(format_signature, fields, &RamfLimits::default())
    }

    /// Build a message, enforcing `limits`.
    ///
    /// The creation time is truncated to whole seconds, which is all the
    /// wire format can carry.
    pub fn with_limits(
        format_signature: FormatSignature,
        mut fields: MessageFields,
        limits: &RamfLimits,
    ) -> Result<Self> {
        fields.validate(limits)?;
        fields.creation_time = fields.creation_time.trunc_subsecs(0);
        Ok(Self {
            format_signature,
            fields,
        })
    }

    pub fn format_signature(&self) -> FormatSignature {
        self.format_signature
    }

    pub fn fields(&self) -> &MessageFields {
        &self.fields
    }

    pub fn into_fields(self) -> MessageFields {
        self.fields
    }

    pub fn recipient_address(&self) -> &str {
        &self.fields.recipient_address
    }

    pub fn message_id(&self) -> &str {
        &self.fields.message_id
    }

    pub fn creation_time(&self) -> DateTime<Utc> {
        self.fields.creation_time
    }

    pub fn ttl(&self) -> u32 {
        self.fields.ttl
    }

    pub fn payload(&self) -> &[u8] {
        &self.fields.payload
    }

    pub fn serialize(&self) -> Result<Vec<u8>> {
        let creation_time = self
            .fields
            .creation_time
            .format(CREATION_TIME_FORMAT)
            .to_string();
        let values = [
            asn1::visible_string(&self.fields.recipient_address)?,
            asn1::visible_string(&self.fields.message_id)?,
            asn1::generalized_time(&creation_time)?,
            asn1::integer(u64::from(self.fields.ttl))?,
            asn1::octet_string(&self.fields.payload)?,
        ];
        let fields = asn1::serialize_sequence(&values, true)?;

        let mut serialization = Vec::with_capacity(FORMAT_SIGNATURE_LENGTH + fields.len());
        serialization.extend_from_slice(&self.format_signature.to_bytes());
        serialization.extend_from_slice(&fields);
        Ok(serialization)
    }

    /// Parse a message of the given type and version, enforcing the default limits.
    pub fn deserialize(serialization: &[u8], format_signature: FormatSignature) -> Result<Self> {
        Self::deserialize_with_limits(serialization, format_signature, &RamfLimits::default())
    }

    /// Parse a message of the given type and version, enforcing `limits`.
    pub fn deserialize_with_limits(
        serialization: &[u8],
        format_signature: FormatSignature,
        limits: &RamfLimits,
    ) -> Result<Self> {
        format_signature.verify(serialization).map_err(|error| {
            tracing::debug!(%error, "rejected RAMF format signature");
            error
        })?;

        let fields = asn1::deserialize_sequence(&serialization[FORMAT_SIGNATURE_LENGTH..])?;
        let [recipient_address, message_id, creation_time, ttl, payload]: [Any; FIELD_COUNT] =
            fields
                .try_into()
                .map_err(|fields: Vec<Any>| RamfError::InvalidFieldCount(fields.len()))?;

        let ttl = asn1::get_integer(&ttl, false)?;
        let ttl = u32::try_from(ttl)
            .ok()
            .filter(|ttl| *ttl <= limits.max_ttl)
            .ok_or(RamfError::TtlTooLong {
                max: limits.max_ttl,
                actual: ttl,
            })?;

        let fields = MessageFields {
            recipient_address: asn1::get_visible_string(&recipient_address, false)?,
            message_id: asn1::get_visible_string(&message_id, false)?,
            creation_time: parse_creation_time(&asn1::get_generalized_time_string(
                &creation_time,
                false,
            )?)?,
            ttl,
            payload: asn1::get_octet_string(&payload, false)?,
        };

        Self::with_limits(format_signature, fields, limits)
    }
}

fn validate_visible_string(field: &'static str, value: &str) -> Result<()> {
    if value.bytes().all(|byte| (0x20..=0x7e).contains(&byte)) {
        Ok(())
    } else {
        Err(RamfError::InvalidCharacters { field })
    }
}

/// Parse `YYYYMMDDHHMMSS`, optionally followed by `Z`.
fn parse_creation_time(text: &str) -> Result<DateTime<Utc>> {
    let malformed = || RamfError::MalformedCreationTime(text.to_owned());

    if !text.is_ascii() || text.len() < 14 {
        return Err(malformed());
    }
    let (digits, designator) = text.split_at(14);
    if !digits.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(malformed());
    }
    match designator {
        "" | "Z" => {}
        offset if is_utc_offset(offset) => {
            return Err(RamfError::NonUtcCreationTime(text.to_owned()))
        }
        _ => return Err(malformed()),
    }

    let number = |range: std::ops::Range<usize>| {
        digits[range].parse::<u32>().map_err(|_| malformed())
    };
    let year = i32::try_from(number(0..4)?).map_err(|_| malformed())?;
    let (month, day) = (number(4..6)?, number(6..8)?);
    let (hour, minute, second) = (number(8..10)?, number(10..12)?, number(12..14)?);
    let date_time = NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, minute, second))
        .ok_or_else(malformed)?;

    Ok(Utc.from_utc_datetime(&date_time))
}

/// `+hh`, `-hh`, `+hhmm` or `-hhmm`.
fn is_utc_offset(designator: &str) -> bool {
    let Some(digits) = designator
        .strip_prefix('+')
        .or_else(|| designator.strip_prefix('-'))
    else {
        return false;
    };
    matches!(digits.len(), 2 | 4) && digits.bytes().all(|byte| byte.is_ascii_digit())
}
