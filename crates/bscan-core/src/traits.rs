//! Trait abstractions for the BLE boundary.
//!
//! These traits separate the connect-and-write logic from btleplug so the
//! same code runs against a real [`btleplug::platform::Adapter`] and against
//! the mocks in [`crate::mock`].

use std::time::Duration;

use async_trait::async_trait;

use bscan_types::{CharacteristicInfo, DiscoveredPeripheral, ServiceInfo};

use crate::device::ConnectionConfig;
use crate::error::Result;
use crate::send::SendEvent;

/// Something that can run a timed discovery scan.
#[async_trait]
pub trait Discovery: Send + Sync {
    /// Scan for `duration` and return the peripherals seen, in stack order.
    async fn discover(&self, duration: Duration) -> Result<Vec<DiscoveredPeripheral>>;
}

/// Something that can open a connection to a peripheral by identifier.
#[async_trait]
pub trait Connector: Send + Sync {
    /// The open connection type.
    type Link: GattLink + 'static;

    /// Open a connection, bounded by `config.connection_timeout`.
    async fn connect(&self, identifier: &str, config: &ConnectionConfig) -> Result<Self::Link>;
}

/// An open connection to one peripheral.
///
/// A link is scoped to a single connect-and-write attempt; nothing read from
/// it is kept after [`GattLink::disconnect`].
#[async_trait]
pub trait GattLink: Send + Sync {
    /// Identifier the link was opened with.
    fn identifier(&self) -> &str;

    /// Whether the stack reports the link as connected.
    async fn is_connected(&self) -> bool;

    /// Resolve services and their characteristics.
    async fn discover_services(&self) -> Result<Vec<ServiceInfo>>;

    /// Write `data` to a characteristic with a write request.
    async fn write(&self, characteristic: &CharacteristicInfo, data: &[u8]) -> Result<()>;

    /// Close the connection.
    async fn disconnect(&self) -> Result<()>;
}

/// The person driving a connect-and-write run.
///
/// Receives progress and answers the manual characteristic prompt.
pub trait Operator: Send {
    /// Progress notification.
    fn on_event(&mut self, event: &SendEvent);

    /// Show `characteristics` (numbered from 1) and return the raw answer.
    ///
    /// `None` means no answer could be read, which aborts like an invalid one.
    fn choose_characteristic(&mut self, characteristics: &[CharacteristicInfo]) -> Option<String>;
}
