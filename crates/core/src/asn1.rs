//! Generic DER sequence codec.
//!
//! Values are laid out as a `SEQUENCE` whose items carry a context-specific
//! tag equal to their position (`[0]`, `[1]`, ...). Items may be tagged
//! implicitly (the item's own tag is replaced) or explicitly (the item is
//! wrapped in a constructed tag), but only implicit tagging is accepted when
//! reading a sequence back.
//!
//! The typed getters (`get_oid`, `get_visible_string`, ...) turn one tagged
//! item back into a Rust value, checking its type along the way.

use der::asn1::{ObjectIdentifier, OctetStringRef};
use der::{Any, Decode, Encode, Reader, SliceReader, Tag, TagNumber, Tagged};

use crate::error::{Asn1Error, Asn1Result};

/// Maximum number of items in a sequence (positions `[0]` to `[30]`).
pub const MAX_SEQUENCE_LENGTH: usize = 31;

/// Serialize `values` as a DER sequence, tagging each one with its position.
pub fn serialize_sequence(values: &[Any], implicit_tagging: bool) -> Asn1Result<Vec<u8>> {
    if values.len() > MAX_SEQUENCE_LENGTH {
        return Err(Asn1Error::SequenceTooLong {
            length: values.len(),
            max: MAX_SEQUENCE_LENGTH,
        });
    }

    let mut content = Vec::new();
    for (position, value) in values.iter().enumerate() {
        let tagged = tag_value(value, position as u8, implicit_tagging)?;
        tagged.encode_to_vec(&mut content)?;
    }

    let sequence = Any::new(Tag::Sequence, content)?;
    Ok(sequence.to_der()?)
}

/// Parse a DER sequence whose items are all implicitly tagged.
///
/// The items are returned in order and untouched, so they still carry their
/// context-specific tags; use the typed getters to read them.
pub fn deserialize_sequence(serialization: &[u8]) -> Asn1Result<Vec<Any>> {
    if serialization.is_empty() {
        return Err(Asn1Error::EmptyValue);
    }

    let sequence = Any::from_der(serialization).map_err(|_| Asn1Error::NotDer)?;
    if sequence.tag() != Tag::Sequence {
        return Err(Asn1Error::NotASequence);
    }

    let mut reader = SliceReader::new(sequence.value()).map_err(|_| Asn1Error::NotDer)?;
    let mut items = Vec::new();
    while !reader.is_finished() {
        let item = Any::decode(&mut reader).map_err(|_| Asn1Error::NotDer)?;
        match item.tag() {
            // Explicit tags are always constructed; none of the primitive
            // types used on the wire are constructed when tagged implicitly.
            Tag::ContextSpecific {
                constructed: true, ..
            } => return Err(Asn1Error::ExplicitlyTaggedItem),
            Tag::ContextSpecific { .. } => items.push(item),
            _ => return Err(Asn1Error::UntaggedItem),
        }
    }

    Ok(items)
}

/// Read an OBJECT IDENTIFIER from a tagged item.
pub fn get_oid(element: &Any, explicit: bool) -> Asn1Result<ObjectIdentifier> {
    decode_tagged(element, Tag::ObjectIdentifier, explicit, "an OID", |der| {
        ObjectIdentifier::from_der(der)
    })
}

/// Read a VisibleString from a tagged item.
pub fn get_visible_string(element: &Any, explicit: bool) -> Asn1Result<String> {
    decode_tagged(
        element,
        Tag::VisibleString,
        explicit,
        "a VisibleString",
        |der| {
            let string = Any::from_der(der)?;
            if string.tag() != Tag::VisibleString || !is_visible(string.value()) {
                return Err(Tag::VisibleString.value_error());
            }
            std::str::from_utf8(string.value())
                .map(str::to_owned)
                .map_err(|_| Tag::VisibleString.value_error())
        },
    )
}

/// Read an OCTET STRING from a tagged item.
pub fn get_octet_string(element: &Any, explicit: bool) -> Asn1Result<Vec<u8>> {
    decode_tagged(
        element,
        Tag::OctetString,
        explicit,
        "an OctetString",
        |der| OctetStringRef::from_der(der).map(|octets| octets.as_bytes().to_vec()),
    )
}

/// Read a non-negative INTEGER from a tagged item.
pub fn get_integer(element: &Any, explicit: bool) -> Asn1Result<u64> {
    decode_tagged(element, Tag::Integer, explicit, "a non-negative INTEGER", |der| {
        u64::from_der(der)
    })
}

/// Read the raw text of a GeneralizedTime from a tagged item.
///
/// The time zone designator is left in place for the caller to interpret.
pub fn get_generalized_time_string(element: &Any, explicit: bool) -> Asn1Result<String> {
    decode_tagged(
        element,
        Tag::GeneralizedTime,
        explicit,
        "a GeneralizedTime",
        |der| {
            let time = Any::from_der(der)?;
            if time.tag() != Tag::GeneralizedTime {
                return Err(time.tag().value_error());
            }
            let text = std::str::from_utf8(time.value())
                .map_err(|_| Tag::GeneralizedTime.value_error())?;
            if text.is_empty() || !text.bytes().all(|byte| byte.is_ascii_graphic()) {
                return Err(Tag::GeneralizedTime.value_error());
            }
            Ok(text.to_owned())
        },
    )
}

/// Build a VisibleString value.
///
/// Only printable ASCII (`0x20` to `0x7e`) is allowed.
pub fn visible_string(value: &str) -> Asn1Result<Any> {
    if !is_visible(value.as_bytes()) {
        return Err(Tag::VisibleString.value_error().into());
    }
    Ok(Any::new(Tag::VisibleString, value.as_bytes().to_vec())?)
}

/// Build an OCTET STRING value.
pub fn octet_string(value: &[u8]) -> Asn1Result<Any> {
    to_any(&OctetStringRef::new(value)?)
}

/// Build a non-negative INTEGER value.
pub fn integer(value: u64) -> Asn1Result<Any> {
    to_any(&value)
}

/// Build a GeneralizedTime value from its textual form (e.g. `20240101120000Z`).
pub fn generalized_time(value: &str) -> Asn1Result<Any> {
    Ok(Any::new(Tag::GeneralizedTime, value.as_bytes().to_vec())?)
}

/// Build an OBJECT IDENTIFIER value.
pub fn oid(value: &ObjectIdentifier) -> Asn1Result<Any> {
    to_any(value)
}

fn is_visible(bytes: &[u8]) -> bool {
    bytes.iter().all(|byte| (0x20..=0x7e).contains(byte))
}

fn to_any<T: Encode>(value: &T) -> Asn1Result<Any> {
    Ok(Any::from_der(&value.to_der()?)?)
}

fn tag_value(value: &Any, position: u8, implicit_tagging: bool) -> Asn1Result<Any> {
    let number = TagNumber::new(position);
    let tagged = if implicit_tagging {
        Any::new(
            Tag::ContextSpecific {
                constructed: value.tag().is_constructed(),
                number,
            },
            value.value().to_vec(),
        )?
    } else {
        Any::new(
            Tag::ContextSpecific {
                constructed: true,
                number,
            },
            value.to_der()?,
        )?
    };
    Ok(tagged)
}

fn decode_tagged<T>(
    element: &Any,
    universal_tag: Tag,
    explicit: bool,
    expected: &'static str,
    decode: impl FnOnce(&[u8]) -> der::Result<T>,
) -> Asn1Result<T> {
    let invalid = |source| Asn1Error::InvalidValue { expected, source };

    let der = if explicit {
        element.value().to_vec()
    } else {
        Any::new(universal_tag, element.value().to_vec())
            .and_then(|untagged| untagged.to_der())
            .map_err(invalid)?
    };

    decode(&der).map_err(invalid)
}
