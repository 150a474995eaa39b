//! Concrete RAMF messages.
//!
//! A **parcel** carries a service message between two endpoints; a **cargo**
//! carries a batch of parcels (and other messages) between two gateways.
//! Both encrypt their payload for the recipient.

use relaynet_core::RamfLimits;

use crate::encrypted::EncryptedMessage;
use crate::error::Result;
use crate::payloads::{CargoMessageSet, ServiceMessage};
use crate::ramf::{FormatSignature, MessageFields, RamfMessage};

/// Format signature of parcels: type `0x50` ("P"), version 0.
pub const PARCEL_FORMAT_SIGNATURE: FormatSignature = FormatSignature::new(0x50, 0x00);

/// Format signature of cargo: type `0x43` ("C"), version 0.
pub const CARGO_FORMAT_SIGNATURE: FormatSignature = FormatSignature::new(0x43, 0x00);

macro_rules! encrypted_message {
    ($(#[$meta:meta])* $name:ident, $signature:expr, $payload:ty) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct $name {
            ramf: RamfMessage,
        }

        impl $name {
            pub fn new(fields: MessageFields) -> Result<Self> {
                Self::with_limits(fields, &RamfLimits::default())
            }

            pub fn with_limits(fields: MessageFields, limits: &RamfLimits) -> Result<Self> {
                Ok(Self {
                    ramf: RamfMessage::with_limits($signature, fields, limits)?,
                })
            }

            pub fn serialize(&self) -> Result<Vec<u8>> {
                self.ramf.serialize()
            }

            pub fn deserialize(serialization: &[u8]) -> Result<Self> {
                Self::deserialize_with_limits(serialization, &RamfLimits::default())
            }

            pub fn deserialize_with_limits(
                serialization: &[u8],
                limits: &RamfLimits,
            ) -> Result<Self> {
                Ok(Self {
                    ramf: RamfMessage::deserialize_with_limits(serialization, $signature, limits)?,
                })
            }
        }

        impl EncryptedMessage for $name {
            type Payload = $payload;

            fn ramf(&self) -> &RamfMessage {
                &self.ramf
            }
        }
    };
}

encrypted_message!(
    /// Message between two endpoints, carrying a [`ServiceMessage`].
    Parcel,
    PARCEL_FORMAT_SIGNATURE,
    ServiceMessage
);

encrypted_message!(
    /// Message between two gateways, carrying a [`CargoMessageSet`].
    Cargo,
    CARGO_FORMAT_SIGNATURE,
    CargoMessageSet
);
