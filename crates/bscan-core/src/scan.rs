//! Device discovery and scanning.
//!
//! Scans report every peripheral the adapter has seen, not only ones that
//! match a filter. The adapter is passed in explicitly; nothing here keeps
//! global BLE state.

use std::time::Duration;

use async_trait::async_trait;
use btleplug::api::{Central, Manager as _, Peripheral as _, ScanFilter};
use btleplug::platform::{Adapter, Manager, Peripheral};
use tokio::time::sleep;
use tracing::{debug, info};

use bscan_types::DiscoveredPeripheral;

use crate::error::{DeviceNotFoundReason, Error, Result};
use crate::traits::Discovery;
use crate::util::create_identifier;

/// Default scan duration.
pub const DEFAULT_SCAN_DURATION: Duration = Duration::from_secs(5);

/// Options for scanning.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// How long to scan for devices.
    pub duration: Duration,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            duration: DEFAULT_SCAN_DURATION,
        }
    }
}

impl ScanOptions {
    /// Create new scan options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the scan duration.
    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Set scan duration in seconds.
    pub fn duration_secs(mut self, secs: u64) -> Self {
        self.duration = Duration::from_secs(secs);
        self
    }
}

/// Get the first available Bluetooth adapter.
pub async fn get_adapter() -> Result<Adapter> {
    let manager = Manager::new().await?;
    let adapters = manager.adapters().await?;

    adapters
        .into_iter()
        .next()
        .ok_or(Error::DeviceNotFound(DeviceNotFoundReason::NoAdapter))
}

/// Scan for devices using a specific adapter.
///
/// An empty list means nothing was seen; it is not an error.
///
/// # Errors
///
/// Returns an error if the scan could not be started or stopped, or the
/// adapter could not list its peripherals.
#[tracing::instrument(level = "info", skip_all, fields(duration_secs = options.duration.as_secs()))]
pub async fn scan_with_adapter(
    adapter: &Adapter,
    options: ScanOptions,
) -> Result<Vec<DiscoveredPeripheral>> {
    info!("Starting BLE scan...");

    adapter.start_scan(ScanFilter::default()).await?;
    sleep(options.duration).await;
    adapter.stop_scan().await?;

    let peripherals = adapter.peripherals().await?;
    let mut discovered = Vec::with_capacity(peripherals.len());

    for peripheral in peripherals {
        match process_peripheral(&peripheral).await {
            Ok(Some(device)) => {
                debug!("Found {} ({:?})", device.identifier, device.name);
                discovered.push(device);
            }
            Ok(None) => {}
            Err(e) => {
                debug!("Error processing peripheral: {}", e);
            }
        }
    }

    info!("Scan complete. Found {} device(s)", discovered.len());
    Ok(discovered)
}

async fn process_peripheral(peripheral: &Peripheral) -> Result<Option<DiscoveredPeripheral>> {
    let Some(properties) = peripheral.properties().await? else {
        return Ok(None);
    };

    let address = properties.address.to_string();
    let identifier = create_identifier(&address, &peripheral.id());

    Ok(Some(DiscoveredPeripheral {
        name: properties.local_name,
        address,
        identifier,
        rssi: properties.rssi,
    }))
}

#[async_trait]
impl Discovery for Adapter {
    async fn discover(&self, duration: Duration) -> Result<Vec<DiscoveredPeripheral>> {
        scan_with_adapter(self, ScanOptions::new().duration(duration)).await
    }
}
