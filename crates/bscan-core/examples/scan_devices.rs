//! Example: Scanning for BLE peripherals
//!
//! Lists every peripheral the first adapter sees during a 10 second scan,
//! numbered the same way the `bscan` prompt numbers them.
//!
//! Run with: `cargo run --example scan_devices`

use std::time::Duration;

use bscan_core::{Discovery, scan};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    println!("Scanning for BLE devices...");
    println!();

    let adapter = scan::get_adapter().await?;
    let devices = adapter.discover(Duration::from_secs(10)).await?;

    if devices.is_empty() {
        println!("No BLE devices found.");
        println!();
        println!("Make sure:");
        println!("  - Bluetooth is enabled on this computer");
        println!("  - The peripheral is advertising and within range");
        return Ok(());
    }

    println!("Found {} device(s):", devices.len());
    println!();
    for (i, device) in devices.iter().enumerate() {
        let rssi = device
            .rssi
            .map(|r| format!("{} dBm", r))
            .unwrap_or_else(|| "n/a".to_string());
        println!("{}: {} (RSSI {})", i + 1, device, rssi);
    }

    Ok(())
}
