//! Connections to BLE peripherals over btleplug.
//!
//! [`BleLink`] is one open connection. It is created by the [`Connector`]
//! implementation on [`Adapter`], so the adapter handle that ran the scan is
//! the same one used to connect.

use std::time::Duration;

use async_trait::async_trait;
use btleplug::api::{CharPropFlags, Characteristic, Central, Peripheral as _, WriteType};
use btleplug::platform::{Adapter, Peripheral};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use bscan_types::{CharProperties, CharacteristicInfo, ServiceInfo};

use crate::error::{Error, Result};
use crate::traits::{Connector, GattLink};
use crate::util::{format_peripheral_id, identifier_matches};

/// Default timeout for BLE connection operations.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default timeout for service discovery.
const DEFAULT_DISCOVERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Default timeout for BLE characteristic write operations.
const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for BLE connection timeouts.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use bscan_core::device::ConnectionConfig;
///
/// let config = ConnectionConfig::default()
///     .connection_timeout(Duration::from_secs(20));
/// assert_eq!(config.connection_timeout, Duration::from_secs(20));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Timeout for establishing a BLE connection.
    pub connection_timeout: Duration,
    /// Timeout for service discovery after connection.
    pub discovery_timeout: Duration,
    /// Timeout for the characteristic write.
    pub write_timeout: Duration,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            connection_timeout: DEFAULT_CONNECT_TIMEOUT,
            discovery_timeout: DEFAULT_DISCOVERY_TIMEOUT,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
        }
    }
}

impl ConnectionConfig {
    /// Create a new connection config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the connection timeout.
    #[must_use]
    pub fn connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    /// Set the service discovery timeout.
    #[must_use]
    pub fn discovery_timeout(mut self, timeout: Duration) -> Self {
        self.discovery_timeout = timeout;
        self
    }

    /// Set the write timeout.
    #[must_use]
    pub fn write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }
}

/// An open connection to a peripheral.
pub struct BleLink {
    peripheral: Peripheral,
    identifier: String,
    config: ConnectionConfig,
}

impl std::fmt::Debug for BleLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BleLink")
            .field("identifier", &self.identifier)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl BleLink {
    /// Look up the btleplug characteristic matching a resolved one.
    fn find_characteristic(&self, target: &CharacteristicInfo) -> Result<Characteristic> {
        self.peripheral
            .characteristics()
            .into_iter()
            .find(|c| c.uuid == target.uuid && c.service_uuid == target.service_uuid)
            .ok_or_else(|| {
                Error::characteristic_not_found(
                    target.uuid.to_string(),
                    self.peripheral.services().len(),
                )
            })
    }
}

#[async_trait]
impl GattLink for BleLink {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    async fn is_connected(&self) -> bool {
        self.peripheral.is_connected().await.unwrap_or(false)
    }

    async fn discover_services(&self) -> Result<Vec<ServiceInfo>> {
        info!("Discovering services...");
        timeout(self.config.discovery_timeout, self.peripheral.discover_services())
            .await
            .map_err(|_| Error::timeout("discover services", self.config.discovery_timeout))??;

        let services: Vec<ServiceInfo> = self
            .peripheral
            .services()
            .into_iter()
            .map(|service| {
                debug!("  Service: {}", service.uuid);
                let characteristics = service
                    .characteristics
                    .iter()
                    .map(|c| {
                        debug!("    Characteristic: {} ({:?})", c.uuid, c.properties);
                        CharacteristicInfo::new(
                            c.uuid,
                            c.service_uuid,
                            convert_properties(c.properties),
                        )
                    })
                    .collect();
                ServiceInfo {
                    uuid: service.uuid,
                    primary: service.primary,
                    characteristics,
                }
            })
            .collect();

        debug!("Found {} services", services.len());
        Ok(services)
    }

    async fn write(&self, characteristic: &CharacteristicInfo, data: &[u8]) -> Result<()> {
        let target = self.find_characteristic(characteristic)?;
        debug!("Writing {} bytes to {}", data.len(), target.uuid);

        timeout(
            self.config.write_timeout,
            self.peripheral.write(&target, data, WriteType::WithResponse),
        )
        .await
        .map_err(|_| Error::timeout("write characteristic", self.config.write_timeout))?
        .map_err(|e| Error::write_failed(target.uuid.to_string(), e.to_string()))
    }

    #[tracing::instrument(level = "info", skip(self), fields(identifier = %self.identifier))]
    async fn disconnect(&self) -> Result<()> {
        info!("Disconnecting from device...");
        self.peripheral.disconnect().await?;
        Ok(())
    }
}

#[async_trait]
impl Connector for Adapter {
    type Link = BleLink;

    #[tracing::instrument(level = "info", skip(self, config), fields(connect_timeout = ?config.connection_timeout))]
    async fn connect(&self, identifier: &str, config: &ConnectionConfig) -> Result<BleLink> {
        let peripheral = find_peripheral(self, identifier)
            .await?
            .ok_or_else(|| Error::device_not_found(identifier))?;

        info!("Connecting to device...");
        match timeout(config.connection_timeout, peripheral.connect()).await {
            Ok(result) => result?,
            Err(_) => {
                // The stack may still be connecting; do not leave it behind.
                if let Err(e) = peripheral.disconnect().await {
                    warn!("Failed to cancel timed-out connection: {}", e);
                }
                return Err(Error::timeout("connect to device", config.connection_timeout));
            }
        }
        info!("Connected!");

        Ok(BleLink {
            peripheral,
            identifier: identifier.to_string(),
            config: config.clone(),
        })
    }
}

/// Search the adapter's known peripherals for one matching the identifier.
async fn find_peripheral(adapter: &Adapter, identifier: &str) -> Result<Option<Peripheral>> {
    for peripheral in adapter.peripherals().await? {
        let peripheral_id = format_peripheral_id(&peripheral.id());
        let address = match peripheral.properties().await {
            Ok(Some(props)) => props.address.to_string(),
            _ => String::new(),
        };

        if identifier_matches(identifier, &address, &peripheral_id) {
            debug!("Matched {} as {}", identifier, peripheral_id);
            return Ok(Some(peripheral));
        }
    }

    Ok(None)
}

fn convert_properties(flags: CharPropFlags) -> CharProperties {
    const MAPPING: [(CharPropFlags, CharProperties); 8] = [
        (CharPropFlags::BROADCAST, CharProperties::BROADCAST),
        (CharPropFlags::READ, CharProperties::READ),
        (
            CharPropFlags::WRITE_WITHOUT_RESPONSE,
            CharProperties::WRITE_WITHOUT_RESPONSE,
        ),
        (CharPropFlags::WRITE, CharProperties::WRITE),
        (CharPropFlags::NOTIFY, CharProperties::NOTIFY),
        (CharPropFlags::INDICATE, CharProperties::INDICATE),
        (
            CharPropFlags::AUTHENTICATED_SIGNED_WRITES,
            CharProperties::AUTHENTICATED_SIGNED_WRITES,
        ),
        (
            CharPropFlags::EXTENDED_PROPERTIES,
            CharProperties::EXTENDED_PROPERTIES,
        ),
    ];

    let mut properties = CharProperties::empty();
    for (flag, property) in MAPPING {
        if flags.contains(flag) {
            properties.insert(property);
        }
    }
    properties
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_config_defaults() {
        let config = ConnectionConfig::default();
        assert_eq!(config.connection_timeout, Duration::from_secs(10));
        assert_eq!(config.discovery_timeout, Duration::from_secs(10));
        assert_eq!(config.write_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_connection_config_builder() {
        let config = ConnectionConfig::new()
            .connection_timeout(Duration::from_secs(3))
            .discovery_timeout(Duration::from_secs(4))
            .write_timeout(Duration::from_secs(5));
        assert_eq!(config.connection_timeout, Duration::from_secs(3));
        assert_eq!(config.discovery_timeout, Duration::from_secs(4));
        assert_eq!(config.write_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_convert_properties() {
        let props = convert_properties(CharPropFlags::READ | CharPropFlags::WRITE);
        assert!(props.supports_write());
        assert!(props.contains(CharProperties::READ));
        assert!(!props.contains(CharProperties::NOTIFY));

        let props = convert_properties(CharPropFlags::WRITE_WITHOUT_RESPONSE);
        assert!(!props.supports_write());
        assert_eq!(props, CharProperties::WRITE_WITHOUT_RESPONSE);

        assert_eq!(
            convert_properties(CharPropFlags::empty()),
            CharProperties::empty()
        );
    }
}
