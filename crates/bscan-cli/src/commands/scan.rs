//! Scan command implementation.

use std::io::Write;
use std::time::Duration;

use anyhow::{Context, Result};

use bscan_core::{DiscoveredPeripheral, Discovery};

use crate::cli::OutputFormat;
use crate::style;

/// Run the discovery stage on its own and print what was found.
pub async fn cmd_scan<D, W>(
    discovery: &D,
    duration: Duration,
    format: OutputFormat,
    quiet: bool,
    out: &mut W,
) -> Result<()>
where
    D: Discovery,
    W: Write,
{
    // Spinner only for text output (unless quiet)
    let spinner =
        (!quiet && format == OutputFormat::Text).then(|| style::scanning_spinner(duration));

    let devices = discovery
        .discover(duration)
        .await
        .context("Failed to scan for devices");

    if let Some(sp) = spinner {
        sp.finish_and_clear();
    }
    let devices = devices?;

    let content = match format {
        OutputFormat::Json => format_scan_json(&devices)?,
        OutputFormat::Text => format_scan_text(&devices),
    };
    out.write_all(content.as_bytes())
        .context("Failed to write scan results")?;
    Ok(())
}

/// Numbered `index: name - identifier` lines, as offered by the send prompt.
pub fn format_scan_text(devices: &[DiscoveredPeripheral]) -> String {
    if devices.is_empty() {
        return "No BLE devices found.\n".to_string();
    }

    let mut output = String::new();
    for (i, device) in devices.iter().enumerate() {
        match device.rssi {
            Some(rssi) => output.push_str(&format!("{}: {} ({} dBm)\n", i + 1, device, rssi)),
            None => output.push_str(&format!("{}: {}\n", i + 1, device)),
        }
    }
    output
}

/// Pretty-printed JSON array of the discovered peripherals.
pub fn format_scan_json(devices: &[DiscoveredPeripheral]) -> Result<String> {
    let mut json =
        serde_json::to_string_pretty(devices).context("Failed to serialize scan results")?;
    json.push('\n');
    Ok(json)
}

#[cfg(test)]
mod tests {
    use bscan_core::MockDiscovery;

    use super::*;

    fn devices() -> Vec<DiscoveredPeripheral> {
        let mut sensor = DiscoveredPeripheral::new(Some("Sensor"), "AA:BB:CC:DD:EE:FF");
        sensor.rssi = Some(-61);
        vec![sensor, DiscoveredPeripheral::new(None, "11:22:33:44:55:66")]
    }

    #[test]
    fn test_format_scan_text() {
        assert_eq!(
            format_scan_text(&devices()),
            "1: Sensor - AA:BB:CC:DD:EE:FF (-61 dBm)\n2: Unknown - 11:22:33:44:55:66\n"
        );
        assert_eq!(format_scan_text(&[]), "No BLE devices found.\n");
    }

    #[test]
    fn test_format_scan_json() {
        let json = format_scan_json(&devices()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let list = value.as_array().unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0]["name"], "Sensor");
        assert_eq!(list[0]["identifier"], "AA:BB:CC:DD:EE:FF");
        assert_eq!(list[0]["rssi"], -61);
        assert!(list[1]["name"].is_null());
    }

    #[tokio::test]
    async fn test_cmd_scan_writes_results() {
        let discovery = MockDiscovery::new(devices());
        let mut out = Vec::new();

        cmd_scan(
            &discovery,
            Duration::from_secs(2),
            OutputFormat::Json,
            true,
            &mut out,
        )
        .await
        .unwrap();

        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("\"Sensor\""));
        assert_eq!(discovery.last_duration(), Some(Duration::from_secs(2)));
    }

    #[tokio::test]
    async fn test_cmd_scan_propagates_scan_failure() {
        let discovery = MockDiscovery::failing("no adapter");
        let mut out = Vec::new();

        let err = cmd_scan(
            &discovery,
            Duration::from_secs(1),
            OutputFormat::Text,
            true,
            &mut out,
        )
        .await
        .unwrap_err();

        assert!(err.to_string().contains("Failed to scan"));
        assert!(out.is_empty());
    }
}
