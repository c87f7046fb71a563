//! BLE discovery, connection and GATT write engine for bscan.
//!
//! This crate talks to the platform Bluetooth stack through `btleplug`. It
//! scans for peripherals, connects to one, resolves its services and writes a
//! payload to a writable characteristic, retrying the connection on failure.
//!
//! # Features
//!
//! - **Device discovery**: timed scan listing every peripheral the adapter saw
//! - **Connect-and-write**: bounded retries, liveness check, automatic or
//!   operator-chosen characteristic, single GATT write request
//! - **Scoped connections**: every attempt disconnects on every exit path
//! - **Mocks**: scripted adapter, links and operator for hardware-free tests
//!
//! # Platform Differences
//!
//! - **macOS**: peripherals are identified by a CoreBluetooth UUID; the
//!   reported address is `00:00:00:00:00:00`.
//! - **Linux/Windows**: peripherals are identified by their MAC address.
//!
//! [`DiscoveredPeripheral::identifier`](bscan_types::DiscoveredPeripheral)
//! holds whichever applies.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::time::Duration;
//! use bscan_core::{Discovery, SendOptions, connect_and_write, scan, MockOperator};
//! use bscan_types::Payload;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let adapter = scan::get_adapter().await?;
//!     let devices = adapter.discover(Duration::from_secs(5)).await?;
//!     let Some(device) = devices.first() else {
//!         return Ok(());
//!     };
//!
//!     let payload = Payload::new("PING")?;
//!     let mut operator = MockOperator::new();
//!     let outcome = connect_and_write(
//!         &adapter,
//!         &device.identifier,
//!         &payload,
//!         &SendOptions::default(),
//!         &mut operator,
//!     )
//!     .await;
//!     println!("{:?}", outcome);
//!     Ok(())
//! }
//! ```

pub mod device;
pub mod error;
pub mod guard;
pub mod mock;
pub mod scan;
pub mod send;
pub mod traits;
pub mod util;

pub use device::{BleLink, ConnectionConfig};
pub use error::{DeviceNotFoundReason, Error, Result};
pub use guard::ConnectionGuard;
pub use mock::{LinkStats, MockConnect, MockConnector, MockDiscovery, MockLink, MockOperator};
pub use scan::{DEFAULT_SCAN_DURATION, ScanOptions, get_adapter, scan_with_adapter};
pub use send::{DEFAULT_MAX_RETRIES, SendEvent, SendOptions, SendOutcome, connect_and_write};
pub use traits::{Connector, Discovery, GattLink, Operator};
pub use util::{create_identifier, format_peripheral_id};

// Re-export from bscan-types
pub use bscan_types::{
    CharProperties, CharacteristicInfo, DiscoveredPeripheral, Payload, ServiceInfo,
};
