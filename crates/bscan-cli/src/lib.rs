//! Interactive BLE scanner that writes a payload to a writable GATT
//! characteristic.
//!
//! The `bscan` binary scans for nearby peripherals, lets the operator pick
//! one, reads a text payload and writes it to the first characteristic that
//! accepts write requests, asking the operator to choose when none does.
//! Connections are retried a bounded number of times.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `send` | Scan, select, connect and write (default when no command is given) |
//! | `scan` | Scan and list devices as text or JSON |
//! | `completions` | Generate shell completions |
//!
//! # Configuration
//!
//! Settings are read from `~/.config/bscan/config.toml` (or platform
//! equivalent, or `--config <PATH>`):
//!
//! - `scan_timeout`: scan duration in seconds (default 5)
//! - `connect_timeout`: connection timeout per attempt in seconds (default 10)
//! - `max_retries`: connection attempts (default 3)
//! - `no_color`: disable colored output
//! - `banner`: print the banner (default true)
//!
//! Command-line flags override the file.
//!
//! # Environment Variables
//!
//! - `NO_COLOR`: Disable colored output when set
//! - `RUST_LOG`: Log filter when neither `--verbose` nor `--quiet` is given
//!
//! # Examples
//!
//! ```bash
//! bscan
//! bscan send --retries 5 --connect-timeout 20
//! bscan scan --format json
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod console;
pub mod session;
pub mod style;

// Re-export core dependencies for convenience
pub use bscan_core;
pub use bscan_types;
