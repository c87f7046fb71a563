//! Error types for operator input and payload validation in bscan-types.

use thiserror::Error;

/// Errors produced when interpreting an operator's 1-based selection.
///
/// This error type is platform-agnostic and does not include
/// BLE-specific errors (those belong in bscan-core).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum SelectionError {
    /// The answer could not be parsed as a number.
    #[error("'{0}' is not a valid number")]
    NotANumber(String),

    /// The number does not refer to an entry of the list.
    #[error("selection {index} is out of range (1-{count})")]
    OutOfRange {
        /// The 1-based index the operator entered.
        index: i64,
        /// Number of entries that were offered.
        count: usize,
    },
}

/// Errors produced when building a [`crate::Payload`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum PayloadError {
    /// The encoded payload is longer than a single GATT attribute value.
    #[error("payload is {len} bytes, the maximum for a single write is {max} bytes")]
    TooLong {
        /// Encoded payload length.
        len: usize,
        /// Maximum accepted length.
        max: usize,
    },
}

/// Result type alias for selection parsing.
pub type SelectionResult<T> = std::result::Result<T, SelectionError>;
