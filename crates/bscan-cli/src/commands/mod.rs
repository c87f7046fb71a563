//! Command implementations.

mod scan;
mod send;

pub use scan::{cmd_scan, format_scan_json, format_scan_text};
pub use send::cmd_send;
