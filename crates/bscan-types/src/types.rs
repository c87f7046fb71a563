//! Core types for discovered peripherals and their GATT layout.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::PayloadError;

/// Name shown for peripherals that do not advertise a local name.
pub const UNKNOWN_NAME: &str = "Unknown";

/// Maximum length of an ATT attribute value, and so of a single GATT write.
pub const MAX_WRITE_LEN: usize = 512;

/// A peripheral observed during one discovery scan.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DiscoveredPeripheral {
    /// Advertised local name, if any.
    pub name: Option<String>,
    /// The BLE address as reported by the stack (zeros on macOS).
    pub address: String,
    /// Connection identifier: address on Linux/Windows, CoreBluetooth UUID on macOS.
    pub identifier: String,
    /// RSSI at discovery time.
    pub rssi: Option<i16>,
}

impl DiscoveredPeripheral {
    /// Create a peripheral whose identifier is its address.
    pub fn new(name: Option<&str>, address: &str) -> Self {
        Self {
            name: name.map(str::to_string),
            address: address.to_string(),
            identifier: address.to_string(),
            rssi: None,
        }
    }

    /// The advertised name, or `"Unknown"`.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(UNKNOWN_NAME)
    }
}

impl fmt::Display for DiscoveredPeripheral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.display_name(), self.identifier)
    }
}

/// GATT characteristic properties, using the bit layout of the
/// Characteristic Properties field (Core spec Vol 3, Part G, 3.3.1.1).
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct CharProperties(u8);

impl CharProperties {
    pub const BROADCAST: Self = Self(0x01);
    pub const READ: Self = Self(0x02);
    pub const WRITE_WITHOUT_RESPONSE: Self = Self(0x04);
    pub const WRITE: Self = Self(0x08);
    pub const NOTIFY: Self = Self(0x10);
    pub const INDICATE: Self = Self(0x20);
    pub const AUTHENTICATED_SIGNED_WRITES: Self = Self(0x40);
    pub const EXTENDED_PROPERTIES: Self = Self(0x80);

    const NAMES: [(Self, &'static str); 8] = [
        (Self::BROADCAST, "broadcast"),
        (Self::READ, "read"),
        (Self::WRITE_WITHOUT_RESPONSE, "write-without-response"),
        (Self::WRITE, "write"),
        (Self::NOTIFY, "notify"),
        (Self::INDICATE, "indicate"),
        (Self::AUTHENTICATED_SIGNED_WRITES, "authenticated-signed-writes"),
        (Self::EXTENDED_PROPERTIES, "extended-properties"),
    ];

    /// No properties set.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// The raw properties byte.
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Whether every flag in `other` is set.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Set the flags in `other`.
    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    /// Whether the characteristic accepts a write request (with response).
    ///
    /// Write-without-response alone does not qualify.
    pub const fn supports_write(self) -> bool {
        self.contains(Self::WRITE)
    }

    /// Names of the set flags, in bit order.
    pub fn names(self) -> Vec<&'static str> {
        Self::NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect()
    }
}

impl core::ops::BitOr for CharProperties {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl fmt::Debug for CharProperties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CharProperties({})", self.names().join(" | "))
    }
}

impl fmt::Display for CharProperties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.names().join(", "))
    }
}

/// A characteristic resolved on an open connection.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CharacteristicInfo {
    /// Characteristic UUID.
    pub uuid: Uuid,
    /// UUID of the service that owns this characteristic.
    pub service_uuid: Uuid,
    /// Supported operations.
    pub properties: CharProperties,
}

impl CharacteristicInfo {
    pub fn new(uuid: Uuid, service_uuid: Uuid, properties: CharProperties) -> Self {
        Self {
            uuid,
            service_uuid,
            properties,
        }
    }
}

/// A primary or secondary service with its characteristics in stack order.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ServiceInfo {
    pub uuid: Uuid,
    pub primary: bool,
    pub characteristics: Vec<CharacteristicInfo>,
}

impl ServiceInfo {
    pub fn new(uuid: Uuid, characteristics: Vec<CharacteristicInfo>) -> Self {
        Self {
            uuid,
            primary: true,
            characteristics,
        }
    }
}

/// Text sent to a characteristic as its raw UTF-8 bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload(String);

impl Payload {
    /// Wrap operator text, rejecting anything a single write cannot carry.
    ///
    /// The text is taken as is: no trimming, no framing. An empty payload is
    /// a valid zero-length write.
    pub fn new(text: impl Into<String>) -> Result<Self, PayloadError> {
        let text = text.into();
        if text.len() > MAX_WRITE_LEN {
            return Err(PayloadError::TooLong {
                len: text.len(),
                max: MAX_WRITE_LEN,
            });
        }
        Ok(Self(text))
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_falls_back_to_unknown() {
        let named = DiscoveredPeripheral::new(Some("Sensor"), "AA:BB:CC:DD:EE:FF");
        assert_eq!(named.display_name(), "Sensor");
        assert_eq!(named.to_string(), "Sensor - AA:BB:CC:DD:EE:FF");

        let anonymous = DiscoveredPeripheral::new(None, "11:22:33:44:55:66");
        assert_eq!(anonymous.display_name(), "Unknown");
        assert_eq!(anonymous.to_string(), "Unknown - 11:22:33:44:55:66");
    }

    #[test]
    fn test_supports_write_requires_write_flag() {
        assert!(CharProperties::WRITE.supports_write());
        assert!((CharProperties::READ | CharProperties::WRITE).supports_write());
        assert!(!CharProperties::WRITE_WITHOUT_RESPONSE.supports_write());
        assert!(!(CharProperties::READ | CharProperties::NOTIFY).supports_write());
        assert!(!CharProperties::empty().supports_write());
    }

    #[test]
    fn test_properties_display() {
        let props = CharProperties::READ | CharProperties::WRITE | CharProperties::NOTIFY;
        assert_eq!(props.to_string(), "read, write, notify");
        assert_eq!(props.bits(), 0x1A);
        assert_eq!(CharProperties::empty().to_string(), "");
    }

    #[test]
    fn test_properties_insert() {
        let mut props = CharProperties::empty();
        props.insert(CharProperties::INDICATE);
        assert!(props.contains(CharProperties::INDICATE));
        assert!(!props.contains(CharProperties::INDICATE | CharProperties::READ));
    }

    #[test]
    fn test_payload_bytes_are_utf8() {
        let payload = Payload::new("PING").unwrap();
        assert_eq!(payload.as_bytes(), b"PING");
        assert_eq!(payload.len(), 4);

        let payload = Payload::new("h\u{e9}").unwrap();
        assert_eq!(payload.as_bytes(), &[0x68, 0xC3, 0xA9]);
    }

    #[test]
    fn test_payload_keeps_whitespace_and_allows_empty() {
        assert_eq!(Payload::new("  a b ").unwrap().as_bytes(), b"  a b ");
        assert!(Payload::new("").unwrap().is_empty());
    }

    #[test]
    fn test_payload_length_limit() {
        assert!(Payload::new("x".repeat(MAX_WRITE_LEN)).is_ok());
        let err = Payload::new("x".repeat(MAX_WRITE_LEN + 1)).unwrap_err();
        assert_eq!(
            err,
            PayloadError::TooLong {
                len: MAX_WRITE_LEN + 1,
                max: MAX_WRITE_LEN
            }
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_peripheral_json_shape() {
        let device = DiscoveredPeripheral::new(Some("Sensor"), "AA:BB:CC:DD:EE:FF");
        let json = serde_json::to_value(&device).unwrap();
        assert_eq!(json["name"], "Sensor");
        assert_eq!(json["identifier"], "AA:BB:CC:DD:EE:FF");
        assert!(json["rssi"].is_null());
    }
}
