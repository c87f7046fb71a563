//! Mock BLE boundary for testing.
//!
//! This module provides stand-ins for the adapter, connection and operator
//! so the discovery and connect-and-write flow can be tested without
//! Bluetooth hardware.
//!
//! # Features
//!
//! - **Scripted attempts**: [`MockConnector`] plays back one [`MockConnect`]
//!   per connection attempt, then connects normally
//! - **Failure injection**: connect errors, timeouts, dead links, discovery
//!   and write failures
//! - **Call accounting**: connection attempts, disconnects and writes are
//!   recorded for assertions

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use bscan_types::{CharacteristicInfo, DiscoveredPeripheral, ServiceInfo};

use crate::device::ConnectionConfig;
use crate::error::{Error, Result};
use crate::send::SendEvent;
use crate::traits::{Connector, Discovery, GattLink, Operator};

fn mock_error(reason: &str) -> Error {
    Error::Io(std::io::Error::other(reason.to_string()))
}

/// What a [`MockConnector`] does on one connection attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockConnect {
    /// Connect normally.
    Ok,
    /// Fail to connect with the given reason.
    Fail(String),
    /// Time out while connecting.
    Timeout,
    /// Connect, but report the link as not connected.
    Dead,
    /// Connect, then fail service discovery with the given reason.
    DiscoveryFails(String),
    /// Connect, then time out during service discovery.
    DiscoveryTimeout,
}

/// Shared counters for links produced by a mock.
#[derive(Debug, Default)]
pub struct LinkStats {
    disconnects: AtomicU32,
    writes: Mutex<Vec<(Uuid, Vec<u8>)>>,
}

impl LinkStats {
    /// Number of disconnects across all links.
    pub fn disconnects(&self) -> u32 {
        self.disconnects.load(Ordering::SeqCst)
    }

    /// Every successful write, in order.
    pub fn writes(&self) -> Vec<(Uuid, Vec<u8>)> {
        self.writes
            .lock()
            .map(|writes| writes.clone())
            .unwrap_or_default()
    }

    fn record_write(&self, uuid: Uuid, data: &[u8]) {
        if let Ok(mut writes) = self.writes.lock() {
            writes.push((uuid, data.to_vec()));
        }
    }
}

/// A mock connection.
///
/// # Example
///
/// ```
/// use bscan_core::{GattLink, MockLink};
///
/// #[tokio::main]
/// async fn main() {
///     let link = MockLink::new("AA:BB:CC:DD:EE:FF");
///     assert!(link.is_connected().await);
///     assert!(link.discover_services().await.unwrap().is_empty());
/// }
/// ```
#[derive(Debug)]
pub struct MockLink {
    identifier: String,
    connected: bool,
    services: Vec<ServiceInfo>,
    discovery: Option<MockConnect>,
    write_error: Option<String>,
    stats: Arc<LinkStats>,
}

impl MockLink {
    /// A live link with no services.
    pub fn new(identifier: &str) -> Self {
        Self {
            identifier: identifier.to_string(),
            connected: true,
            services: Vec::new(),
            discovery: None,
            write_error: None,
            stats: Arc::new(LinkStats::default()),
        }
    }

    /// Set the services returned by discovery.
    #[must_use]
    pub fn with_services(mut self, services: Vec<ServiceInfo>) -> Self {
        self.services = services;
        self
    }

    /// Make every write fail with `reason`.
    #[must_use]
    pub fn with_write_error(mut self, reason: impl Into<String>) -> Self {
        self.write_error = Some(reason.into());
        self
    }

    /// Counters shared with this link.
    pub fn stats(&self) -> Arc<LinkStats> {
        Arc::clone(&self.stats)
    }
}

#[async_trait]
impl GattLink for MockLink {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    async fn is_connected(&self) -> bool {
        self.connected
    }

    async fn discover_services(&self) -> Result<Vec<ServiceInfo>> {
        match &self.discovery {
            Some(MockConnect::DiscoveryFails(reason)) => Err(mock_error(reason)),
            Some(MockConnect::DiscoveryTimeout) => Err(Error::timeout(
                "discover services",
                ConnectionConfig::default().discovery_timeout,
            )),
            _ => Ok(self.services.clone()),
        }
    }

    async fn write(&self, characteristic: &CharacteristicInfo, data: &[u8]) -> Result<()> {
        if let Some(reason) = &self.write_error {
            return Err(Error::write_failed(characteristic.uuid.to_string(), reason));
        }
        self.stats.record_write(characteristic.uuid, data);
        Ok(())
    }

    async fn disconnect(&self) -> Result<()> {
        self.stats.disconnects.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// A mock adapter that opens [`MockLink`]s.
///
/// # Example
///
/// ```
/// use bscan_core::{MockConnect, MockConnector};
///
/// let connector = MockConnector::new(Vec::new())
///     .with_attempts([MockConnect::Timeout, MockConnect::Fail("busy".into())]);
/// assert_eq!(connector.connect_attempts(), 0);
/// ```
#[derive(Debug)]
pub struct MockConnector {
    services: Vec<ServiceInfo>,
    script: Mutex<VecDeque<MockConnect>>,
    write_error: Option<String>,
    attempts: AtomicU32,
    stats: Arc<LinkStats>,
}

impl MockConnector {
    /// A connector whose links resolve `services`.
    pub fn new(services: Vec<ServiceInfo>) -> Self {
        Self {
            services,
            script: Mutex::new(VecDeque::new()),
            write_error: None,
            attempts: AtomicU32::new(0),
            stats: Arc::new(LinkStats::default()),
        }
    }

    /// Behaviour for the first attempts; later attempts connect normally.
    #[must_use]
    pub fn with_attempts(self, attempts: impl IntoIterator<Item = MockConnect>) -> Self {
        if let Ok(mut script) = self.script.lock() {
            script.extend(attempts);
        }
        self
    }

    /// Make every write fail with `reason`.
    #[must_use]
    pub fn with_write_error(mut self, reason: impl Into<String>) -> Self {
        self.write_error = Some(reason.into());
        self
    }

    /// Number of times `connect` was called.
    pub fn connect_attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Number of disconnects across all links.
    pub fn disconnects(&self) -> u32 {
        self.stats.disconnects()
    }

    /// Every successful write, in order.
    pub fn writes(&self) -> Vec<(Uuid, Vec<u8>)> {
        self.stats.writes()
    }

    fn next_step(&self) -> MockConnect {
        self.script
            .lock()
            .ok()
            .and_then(|mut script| script.pop_front())
            .unwrap_or(MockConnect::Ok)
    }
}

#[async_trait]
impl Connector for MockConnector {
    type Link = MockLink;

    async fn connect(&self, identifier: &str, config: &ConnectionConfig) -> Result<MockLink> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        let step = self.next_step();
        match step {
            MockConnect::Fail(reason) => return Err(mock_error(&reason)),
            MockConnect::Timeout => {
                return Err(Error::timeout("connect to device", config.connection_timeout));
            }
            _ => {}
        }

        Ok(MockLink {
            identifier: identifier.to_string(),
            connected: step != MockConnect::Dead,
            services: self.services.clone(),
            discovery: Some(step),
            write_error: self.write_error.clone(),
            stats: Arc::clone(&self.stats),
        })
    }
}

/// A mock discovery scan returning a fixed list.
#[derive(Debug, Default)]
pub struct MockDiscovery {
    devices: Vec<DiscoveredPeripheral>,
    error: Option<String>,
    scans: AtomicU32,
    last_duration: Mutex<Option<Duration>>,
}

impl MockDiscovery {
    /// A scan that finds `devices`.
    pub fn new(devices: Vec<DiscoveredPeripheral>) -> Self {
        Self {
            devices,
            ..Default::default()
        }
    }

    /// A scan that fails with `reason`.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            error: Some(reason.into()),
            ..Default::default()
        }
    }

    /// Number of scans run.
    pub fn scan_count(&self) -> u32 {
        self.scans.load(Ordering::SeqCst)
    }

    /// Duration requested by the most recent scan.
    pub fn last_duration(&self) -> Option<Duration> {
        self.last_duration.lock().ok().and_then(|d| *d)
    }
}

#[async_trait]
impl Discovery for MockDiscovery {
    async fn discover(&self, duration: Duration) -> Result<Vec<DiscoveredPeripheral>> {
        self.scans.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_duration.lock() {
            *last = Some(duration);
        }
        match &self.error {
            Some(reason) => Err(mock_error(reason)),
            None => Ok(self.devices.clone()),
        }
    }
}

/// An operator that records events and answers from a queue.
#[derive(Debug, Default)]
pub struct MockOperator {
    events: Vec<SendEvent>,
    answers: VecDeque<String>,
    prompts: u32,
    offered: usize,
}

impl MockOperator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an answer for the next characteristic prompt.
    #[must_use]
    pub fn with_answer(mut self, answer: impl Into<String>) -> Self {
        self.answers.push_back(answer.into());
        self
    }

    /// Events received so far.
    pub fn events(&self) -> &[SendEvent] {
        &self.events
    }

    /// Number of characteristic prompts shown.
    pub fn prompts(&self) -> u32 {
        self.prompts
    }

    /// Number of characteristics offered by the last prompt.
    pub fn offered(&self) -> usize {
        self.offered
    }
}

impl Operator for MockOperator {
    fn on_event(&mut self, event: &SendEvent) {
        self.events.push(event.clone());
    }

    fn choose_characteristic(&mut self, characteristics: &[CharacteristicInfo]) -> Option<String> {
        self.prompts += 1;
        self.offered = characteristics.len();
        self.answers.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_connector_plays_script_then_connects() {
        let connector = MockConnector::new(Vec::new())
            .with_attempts([MockConnect::Timeout, MockConnect::Fail("busy".to_string())]);
        let config = ConnectionConfig::default();

        let err = connector.connect("dev", &config).await.unwrap_err();
        assert!(err.is_timeout());

        let err = connector.connect("dev", &config).await.unwrap_err();
        assert_eq!(err.to_string(), "busy");

        let link = connector.connect("dev", &config).await.unwrap();
        assert_eq!(link.identifier(), "dev");
        assert!(link.is_connected().await);
        assert_eq!(connector.connect_attempts(), 3);
    }

    #[tokio::test]
    async fn test_mock_link_records_writes() {
        let link = MockLink::new("dev");
        let stats = link.stats();
        let target = CharacteristicInfo::new(
            Uuid::from_u128(1),
            Uuid::from_u128(2),
            bscan_types::CharProperties::WRITE,
        );

        link.write(&target, b"hi").await.unwrap();
        assert_eq!(stats.writes(), vec![(Uuid::from_u128(1), b"hi".to_vec())]);

        let failing = MockLink::new("dev").with_write_error("rejected");
        let err = failing.write(&target, b"hi").await.unwrap_err();
        assert!(err.to_string().contains("rejected"));
    }

    #[tokio::test]
    async fn test_mock_discovery() {
        let discovery = MockDiscovery::new(vec![DiscoveredPeripheral::new(
            Some("Sensor"),
            "AA:BB:CC:DD:EE:FF",
        )]);
        let devices = discovery.discover(Duration::from_secs(2)).await.unwrap();
        assert_eq!(devices.len(), 1);
        assert_eq!(discovery.scan_count(), 1);
        assert_eq!(discovery.last_duration(), Some(Duration::from_secs(2)));

        let failing = MockDiscovery::failing("adapter powered off");
        assert!(failing.discover(Duration::from_secs(1)).await.is_err());
    }
}
