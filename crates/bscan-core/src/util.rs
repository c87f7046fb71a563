//! Helpers for turning btleplug peripheral handles into identifiers.

use btleplug::platform::PeripheralId;

/// Address reported by CoreBluetooth, which hides real MAC addresses.
pub const ZERO_ADDRESS: &str = "00:00:00:00:00:00";

/// Format a peripheral ID as a string.
///
/// On macOS, peripheral IDs are UUIDs. On other platforms they wrap the
/// Bluetooth address or a D-Bus path.
pub fn format_peripheral_id(id: &PeripheralId) -> String {
    strip_peripheral_id(&format!("{:?}", id)).to_string()
}

/// Create an identifier string from an address and peripheral ID.
///
/// On macOS where addresses are 00:00:00:00:00:00, uses the peripheral ID.
/// On other platforms, uses the Bluetooth address.
pub fn create_identifier(address: &str, peripheral_id: &PeripheralId) -> String {
    if address == ZERO_ADDRESS {
        format_peripheral_id(peripheral_id)
    } else {
        address.to_string()
    }
}

/// Whether an operator-facing identifier refers to the given address or id.
///
/// Comparison is case-insensitive; MAC addresses also match with or without
/// colons.
pub fn identifier_matches(identifier: &str, address: &str, peripheral_id: &str) -> bool {
    let wanted = identifier.to_lowercase();
    if peripheral_id.to_lowercase() == wanted {
        return true;
    }

    let address = address.to_lowercase();
    address != ZERO_ADDRESS
        && (address == wanted || address.replace(':', "") == wanted.replace(':', ""))
}

fn strip_peripheral_id(debug: &str) -> &str {
    debug
        .trim_start_matches("PeripheralId(")
        .trim_end_matches(')')
}
