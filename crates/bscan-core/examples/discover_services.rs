//! Discover all services and characteristics on a device
//!
//! Shows which characteristic `bscan` would write to, without writing.
//!
//! Run with: `cargo run --example discover_services -- AA:BB:CC:DD:EE:FF`

use std::env;
use std::time::Duration;

use bscan_core::{ConnectionConfig, ConnectionGuard, Connector, Discovery, GattLink, scan};
use bscan_types::{first_writable, flatten_characteristics};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    let identifier = if args.len() > 1 {
        &args[1]
    } else {
        eprintln!("Usage: {} <DEVICE_ADDRESS>", args[0]);
        std::process::exit(1);
    };

    println!("Scanning for {}...", identifier);

    let adapter = scan::get_adapter().await?;
    adapter.discover(Duration::from_secs(5)).await?;

    println!("Connecting...");
    let link = adapter
        .connect(identifier, &ConnectionConfig::default())
        .await?;
    let guard = ConnectionGuard::new(link);
    println!("Connected!");

    let services = guard.discover_services().await?;

    println!("\n=== SERVICES AND CHARACTERISTICS ===\n");
    for service in &services {
        println!("Service: {}", service.uuid);
        for c in &service.characteristics {
            println!("  Char: {} [{}]", c.uuid, c.properties);
        }
        println!();
    }

    match first_writable(&services) {
        Some(c) => println!("Would write to: {}", c.uuid),
        None => println!(
            "No writable characteristic; {} would be offered for manual selection.",
            flatten_characteristics(&services).len()
        ),
    }

    guard.release().await?;
    println!("Disconnected.");
    Ok(())
}
