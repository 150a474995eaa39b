//! Payloads carried by parcels and cargo.

use der::Any;
use relaynet_core::asn1;

use crate::encrypted::Payload;
use crate::error::PayloadError;

/// Message exchanged between two endpoints of a service.
///
/// Serialized as a two-item sequence: `[0]` VisibleString type (e.g. a media
/// type) and `[1]` OCTET STRING content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceMessage {
    pub message_type: String,
    pub content: Vec<u8>,
}

impl ServiceMessage {
    pub fn new(message_type: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            message_type: message_type.into(),
            content,
        }
    }
}

impl Payload for ServiceMessage {
    fn serialize(&self) -> Result<Vec<u8>, PayloadError> {
        let values = [
            asn1::visible_string(&self.message_type)?,
            asn1::octet_string(&self.content)?,
        ];
        Ok(asn1::serialize_sequence(&values, true)?)
    }

    fn deserialize(serialization: &[u8]) -> Result<Self, PayloadError> {
        let items = asn1::deserialize_sequence(serialization)?;
        let [message_type, content]: [Any; 2] =
            items
                .try_into()
                .map_err(|items: Vec<Any>| PayloadError::InvalidFieldCount {
                    expected: 2,
                    actual: items.len(),
                })?;

        Ok(Self {
            message_type: asn1::get_visible_string(&message_type, false)?,
            content: asn1::get_octet_string(&content, false)?,
        })
    }
}

/// Set of serialized messages bundled into a cargo.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CargoMessageSet {
    pub messages: Vec<Vec<u8>>,
}

impl CargoMessageSet {
    pub fn new(messages: Vec<Vec<u8>>) -> Self {
        Self { messages }
    }
}

impl Payload for CargoMessageSet {
    fn serialize(&self) -> Result<Vec<u8>, PayloadError> {
        let values = self
            .messages
            .iter()
            .map(|message| asn1::octet_string(message))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(asn1::serialize_sequence(&values, true)?)
    }

    fn deserialize(serialization: &[u8]) -> Result<Self, PayloadError> {
        let messages = asn1::deserialize_sequence(serialization)?
            .iter()
            .map(|item| asn1::get_octet_string(item, false))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { messages })
    }
}
