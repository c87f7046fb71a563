//! Error types for bscan-core.
//!
//! These errors describe failures at the BLE boundary: finding an adapter,
//! scanning, connecting, resolving services and writing characteristics.
//!
//! # How the connect-and-write loop treats them
//!
//! | Stage | Error | Effect |
//! |-------|-------|--------|
//! | connect, liveness, service discovery | [`Error::Timeout`] | reported as a timed-out attempt, retried |
//! | connect, liveness, service discovery | any other | reported as a failed attempt, retried |
//! | write | any | reported once, no retry |
//!
//! The loop never returns these errors to its caller; it folds them into a
//! [`crate::SendOutcome`]. Scanning and adapter lookup do return them.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur when talking to BLE peripherals.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Bluetooth Low Energy error.
    #[error("Bluetooth error: {0}")]
    Bluetooth(#[from] btleplug::Error),

    /// Device not found during scan or connection.
    #[error("Device not found: {0}")]
    DeviceNotFound(DeviceNotFoundReason),

    /// Characteristic is not part of the resolved services.
    #[error("Characteristic not found: {uuid} (searched in {service_count} services)")]
    CharacteristicNotFound {
        /// The UUID that was not found.
        uuid: String,
        /// Number of services that were searched.
        service_count: usize,
    },

    /// Operation timed out.
    #[error("Operation '{operation}' timed out after {duration:?}")]
    Timeout {
        /// The operation that timed out.
        operation: String,
        /// The timeout duration.
        duration: Duration,
    },

    /// Write operation failed.
    #[error("Write failed to characteristic {uuid}: {reason}")]
    WriteFailed {
        /// The characteristic UUID.
        uuid: String,
        /// The reason for the failure.
        reason: String,
    },

    /// I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Reason why a device was not found.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum DeviceNotFoundReason {
    /// Device with specified address/identifier is unknown to the adapter.
    NotFound { identifier: String },
    /// No Bluetooth adapter available.
    NoAdapter,
}

impl std::fmt::Display for DeviceNotFoundReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { identifier } => write!(f, "device '{}' not found", identifier),
            Self::NoAdapter => write!(f, "no Bluetooth adapter available"),
        }
    }
}

impl Error {
    /// Create a device not found error for a specific identifier.
    pub fn device_not_found(identifier: impl Into<String>) -> Self {
        Self::DeviceNotFound(DeviceNotFoundReason::NotFound {
            identifier: identifier.into(),
        })
    }

    /// Create a timeout error with operation context.
    pub fn timeout(operation: impl Into<String>, duration: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    /// Create a characteristic not found error.
    pub fn characteristic_not_found(uuid: impl Into<String>, service_count: usize) -> Self {
        Self::CharacteristicNotFound {
            uuid: uuid.into(),
            service_count,
        }
    }

    /// Create a write failure for a characteristic.
    pub fn write_failed(uuid: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::WriteFailed {
            uuid: uuid.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error is a timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Result type alias using bscan-core's Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::device_not_found("AA:BB:CC:DD:EE:FF");
        assert!(err.to_string().contains("AA:BB:CC:DD:EE:FF"));

        let err = Error::characteristic_not_found("0000ffe1", 3);
        assert!(err.to_string().contains("0000ffe1"));
        assert!(err.to_string().contains("3 services"));

        let err = Error::timeout("connect to device", Duration::from_secs(10));
        assert!(err.to_string().contains("connect to device"));
        assert!(err.to_string().contains("10s"));
    }

    #[test]
    fn test_write_failed_display() {
        let err = Error::write_failed("0000ffe1", "GATT error 0x03");
        assert_eq!(
            err.to_string(),
            "Write failed to characteristic 0000ffe1: GATT error 0x03"
        );
    }

    #[test]
    fn test_is_timeout() {
        assert!(Error::timeout("discover services", Duration::from_secs(1)).is_timeout());
        assert!(!Error::write_failed("0000ffe1", "rejected").is_timeout());
        assert!(!Error::device_not_found("AA:BB:CC:DD:EE:FF").is_timeout());
    }

    #[test]
    fn test_no_adapter_reason() {
        let err = Error::DeviceNotFound(DeviceNotFoundReason::NoAdapter);
        assert!(err.to_string().contains("no Bluetooth adapter"));
    }

    #[test]
    fn test_btleplug_error_conversion() {
        fn _assert_from_impl<T: From<btleplug::Error>>() {}
        _assert_from_impl::<Error>();
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "stdin closed");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().contains("stdin closed"));
    }
}
