//! Platform-agnostic types for BLE discovery and GATT writes.
//!
//! This crate holds the data model shared by the BLE layer (bscan-core) and
//! the command-line front end (bscan-cli). It has no Bluetooth dependency.
//!
//! # Features
//!
//! - Discovered peripherals and resolved services/characteristics
//! - GATT characteristic property flags
//! - Length-checked text payloads
//! - 1-based operator selection and the writable-characteristic policy
//!
//! # Example
//!
//! ```
//! use bscan_types::{CharProperties, CharacteristicInfo, ServiceInfo, first_writable};
//! use uuid::Uuid;
//!
//! let service = ServiceInfo::new(
//!     Uuid::from_u128(0xFFE0),
//!     vec![CharacteristicInfo::new(
//!         Uuid::from_u128(0xFFE1),
//!         Uuid::from_u128(0xFFE0),
//!         CharProperties::WRITE,
//!     )],
//! );
//! assert!(first_writable(&[service]).is_some());
//! ```

pub mod error;
pub mod selection;
pub mod types;

pub use error::{PayloadError, SelectionError, SelectionResult};
pub use selection::{first_writable, flatten_characteristics, parse_selection};
pub use types::{
    CharProperties, CharacteristicInfo, DiscoveredPeripheral, MAX_WRITE_LEN, Payload, ServiceInfo,
    UNKNOWN_NAME,
};
