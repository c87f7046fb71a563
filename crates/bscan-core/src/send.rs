//! Connect to a peripheral and write a payload, retrying the connection.
//!
//! [`connect_and_write`] makes up to [`SendOptions::max_retries`] attempts.
//! Each attempt connects, checks the link is live, resolves services, picks
//! a characteristic and writes. Failures before the write are retried;
//! everything after a characteristic has been chosen is final.
//!
//! # Example
//!
//! ```ignore
//! use bscan_core::{SendOptions, connect_and_write, scan};
//! use bscan_types::Payload;
//!
//! let adapter = scan::get_adapter().await?;
//! let payload = Payload::new("PING")?;
//! let outcome = connect_and_write(
//!     &adapter,
//!     "AA:BB:CC:DD:EE:FF",
//!     &payload,
//!     &SendOptions::default(),
//!     &mut operator,
//! )
//! .await;
//! ```

use tracing::{info, warn};
use uuid::Uuid;

use bscan_types::{
    CharacteristicInfo, Payload, ServiceInfo, first_writable, flatten_characteristics,
    parse_selection,
};

use crate::device::ConnectionConfig;
use crate::error::Error;
use crate::guard::ConnectionGuard;
use crate::traits::{Connector, GattLink, Operator};

/// Default number of connection attempts.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Options for [`connect_and_write`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendOptions {
    /// Maximum number of connection attempts.
    pub max_retries: u32,
    /// Per-attempt timeouts.
    pub connection: ConnectionConfig,
}

impl Default for SendOptions {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            connection: ConnectionConfig::default(),
        }
    }
}

impl SendOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of connection attempts.
    #[must_use]
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the per-attempt timeouts.
    #[must_use]
    pub fn connection(mut self, connection: ConnectionConfig) -> Self {
        self.connection = connection;
        self
    }
}

/// Progress reported to the [`Operator`] while sending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendEvent {
    /// A connection opened; its liveness is checked next.
    Connecting {
        identifier: String,
        attempt: u32,
        max_attempts: u32,
    },
    /// The connection is open and live.
    Connected { attempt: u32 },
    /// The connection opened but the stack does not report it as live.
    NotConnected { attempt: u32 },
    /// A writable characteristic was picked automatically.
    WritableFound { uuid: Uuid },
    /// No characteristic accepts writes; the operator will be asked.
    NoWritableCharacteristic { available: usize },
    /// The operator picked a characteristic.
    CharacteristicSelected { uuid: Uuid },
    /// Connecting or resolving services timed out.
    AttemptTimedOut { attempt: u32 },
    /// Connecting or resolving services failed.
    AttemptFailed { attempt: u32, reason: String },
    /// Another attempt follows.
    Retrying { next_attempt: u32 },
}

/// How a [`connect_and_write`] run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// The payload was written.
    Sent {
        attempt: u32,
        characteristic: Uuid,
        bytes: usize,
    },
    /// Manual characteristic selection was invalid or missing.
    SelectionAborted { reason: String },
    /// The write itself failed.
    WriteFailed { characteristic: Uuid, reason: String },
    /// Every attempt failed before a characteristic was chosen.
    RetriesExhausted { attempts: u32 },
}

impl SendOutcome {
    /// Whether the payload was written.
    pub fn is_sent(&self) -> bool {
        matches!(self, Self::Sent { .. })
    }
}

enum Attempt {
    Finished(SendOutcome),
    Failed,
}

/// Connect to `identifier` and write `payload` to a writable characteristic.
///
/// Never returns an error: connection failures are reported through the
/// operator and retried, and every terminal state is a [`SendOutcome`].
#[tracing::instrument(level = "info", skip_all, fields(identifier = %identifier, max_retries = options.max_retries))]
pub async fn connect_and_write<C, O>(
    connector: &C,
    identifier: &str,
    payload: &Payload,
    options: &SendOptions,
    operator: &mut O,
) -> SendOutcome
where
    C: Connector,
    O: Operator + ?Sized,
{
    for attempt in 1..=options.max_retries {
        match run_attempt(connector, identifier, payload, options, attempt, operator).await {
            Attempt::Finished(outcome) => return outcome,
            Attempt::Failed if attempt < options.max_retries => {
                operator.on_event(&SendEvent::Retrying {
                    next_attempt: attempt + 1,
                });
            }
            Attempt::Failed => {}
        }
    }

    warn!("Giving up after {} attempt(s)", options.max_retries);
    SendOutcome::RetriesExhausted {
        attempts: options.max_retries,
    }
}

async fn run_attempt<C, O>(
    connector: &C,
    identifier: &str,
    payload: &Payload,
    options: &SendOptions,
    attempt: u32,
    operator: &mut O,
) -> Attempt
where
    C: Connector,
    O: Operator + ?Sized,
{
    let link = match connector.connect(identifier, &options.connection).await {
        Ok(link) => link,
        Err(e) => {
            report_failure(operator, attempt, &e);
            return Attempt::Failed;
        }
    };
    operator.on_event(&SendEvent::Connecting {
        identifier: identifier.to_string(),
        attempt,
        max_attempts: options.max_retries,
    });

    let guard = ConnectionGuard::new(link);
    let result = write_connected(guard.link(), payload, attempt, operator).await;

    if let Err(e) = guard.release().await {
        warn!("Failed to disconnect after attempt {}: {}", attempt, e);
    }

    result
}

async fn write_connected<L, O>(
    link: &L,
    payload: &Payload,
    attempt: u32,
    operator: &mut O,
) -> Attempt
where
    L: GattLink,
    O: Operator + ?Sized,
{
    if !link.is_connected().await {
        operator.on_event(&SendEvent::NotConnected { attempt });
        return Attempt::Failed;
    }
    operator.on_event(&SendEvent::Connected { attempt });

    let services = match link.discover_services().await {
        Ok(services) => services,
        Err(e) => {
            report_failure(operator, attempt, &e);
            return Attempt::Failed;
        }
    };

    let characteristic = match select_characteristic(&services, operator) {
        Ok(characteristic) => characteristic,
        Err(reason) => return Attempt::Finished(SendOutcome::SelectionAborted { reason }),
    };

    match link.write(&characteristic, payload.as_bytes()).await {
        Ok(()) => {
            info!(
                "Wrote {} bytes to {} on attempt {}",
                payload.len(),
                characteristic.uuid,
                attempt
            );
            Attempt::Finished(SendOutcome::Sent {
                attempt,
                characteristic: characteristic.uuid,
                bytes: payload.len(),
            })
        }
        Err(e) => {
            warn!("Write to {} failed: {}", characteristic.uuid, e);
            Attempt::Finished(SendOutcome::WriteFailed {
                characteristic: characteristic.uuid,
                reason: e.to_string(),
            })
        }
    }
}

/// Pick the first writable characteristic, or ask the operator.
fn select_characteristic<O>(
    services: &[ServiceInfo],
    operator: &mut O,
) -> Result<CharacteristicInfo, String>
where
    O: Operator + ?Sized,
{
    if let Some(characteristic) = first_writable(services) {
        operator.on_event(&SendEvent::WritableFound {
            uuid: characteristic.uuid,
        });
        return Ok(characteristic.clone());
    }

    let available = flatten_characteristics(services);
    operator.on_event(&SendEvent::NoWritableCharacteristic {
        available: available.len(),
    });

    let answer = operator
        .choose_characteristic(&available)
        .ok_or_else(|| "no selection entered".to_string())?;
    let index = parse_selection(&answer, available.len()).map_err(|e| e.to_string())?;

    let characteristic = available[index].clone();
    operator.on_event(&SendEvent::CharacteristicSelected {
        uuid: characteristic.uuid,
    });
    Ok(characteristic)
}

fn report_failure<O>(operator: &mut O, attempt: u32, error: &Error)
where
    O: Operator + ?Sized,
{
    warn!("Attempt {} failed: {}", attempt, error);
    let event = if error.is_timeout() {
        SendEvent::AttemptTimedOut { attempt }
    } else {
        SendEvent::AttemptFailed {
            attempt,
            reason: error.to_string(),
        }
    };
    operator.on_event(&event);
}
