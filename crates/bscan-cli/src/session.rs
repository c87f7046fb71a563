//! The interactive pipeline: discover, select a device, read a payload,
//! connect and write.
//!
//! Every stage-level failure ends the session with a message and a
//! [`SessionOutcome`]; only infrastructure failures (scan errors, a broken
//! console) are returned as errors.

use std::io::{BufRead, Write};
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

use bscan_core::{Connector, Discovery, SendOptions, SendOutcome, connect_and_write};
use bscan_types::{Payload, PayloadError, SelectionError, parse_selection};

use crate::console::Console;
use crate::style;

/// Settings for one session, resolved from flags and config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    /// How long to scan.
    pub scan_duration: Duration,
    /// Connect-and-write options.
    pub send: SendOptions,
    /// Print the banner first.
    pub banner: bool,
    /// Show a spinner while scanning.
    pub spinner: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            scan_duration: bscan_core::DEFAULT_SCAN_DURATION,
            send: SendOptions::default(),
            banner: true,
            spinner: false,
        }
    }
}

/// Where a session stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The scan found nothing.
    NoDevices,
    /// The device index was not a number or out of range.
    InvalidSelection(SelectionError),
    /// The payload cannot be written in one request.
    InvalidPayload(PayloadError),
    /// Input ended before a prompt was answered.
    InputClosed,
    /// Connect-and-write ran.
    Finished(SendOutcome),
}

/// Run the whole pipeline once.
pub async fn run_session<D, C, R, W>(
    discovery: &D,
    connector: &C,
    console: &mut Console<R, W>,
    settings: &SessionSettings,
) -> Result<SessionOutcome>
where
    D: Discovery,
    C: Connector,
    R: BufRead + Send,
    W: Write + Send,
{
    let color = console.color();
    if settings.banner {
        console.say(style::banner(color))?;
    }
    console.say("Scanning for BLE devices...")?;

    let spinner = settings
        .spinner
        .then(|| style::scanning_spinner(settings.scan_duration));
    let scan = discovery.discover(settings.scan_duration).await;
    if let Some(sp) = spinner {
        sp.finish_and_clear();
    }
    let devices = scan.context("Failed to scan for devices")?;

    if devices.is_empty() {
        console.say("No BLE devices found.")?;
        console.say("No devices found. Please try again.")?;
        return Ok(SessionOutcome::NoDevices);
    }
    for (i, device) in devices.iter().enumerate() {
        console.say(format!("{}: {}", i + 1, device))?;
    }

    let Some(answer) = console.prompt("Select the device by entering its number: ")? else {
        return input_closed(console);
    };
    let index = match parse_selection(&answer, devices.len()) {
        Ok(index) => index,
        Err(e) => {
            let message = match e {
                SelectionError::NotANumber(_) => "Please enter a valid number. Exiting.",
                _ => "Invalid selection.",
            };
            console.say(style::failure(message, color))?;
            return Ok(SessionOutcome::InvalidSelection(e));
        }
    };

    let device = &devices[index];
    info!("Selected {}", device.identifier);
    console.say(format!("Selected device: {}", device))?;

    let Some(text) = console.prompt("Enter the payload to send: ")? else {
        return input_closed(console);
    };
    let payload = match Payload::new(text) {
        Ok(payload) => payload,
        Err(e) => {
            console.say(style::failure(&format!("Invalid payload: {}", e), color))?;
            return Ok(SessionOutcome::InvalidPayload(e));
        }
    };

    let outcome =
        connect_and_write(connector, &device.identifier, &payload, &settings.send, console).await;
    report_outcome(console, &outcome)?;
    Ok(SessionOutcome::Finished(outcome))
}

fn input_closed<R: BufRead, W: Write>(console: &mut Console<R, W>) -> Result<SessionOutcome> {
    console.say("")?;
    console.say("No input. Exiting.")?;
    Ok(SessionOutcome::InputClosed)
}

fn report_outcome<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    outcome: &SendOutcome,
) -> Result<()> {
    let color = console.color();
    let line = match outcome {
        SendOutcome::Sent { .. } => style::success("Payload sent successfully!", color),
        SendOutcome::SelectionAborted { .. } => style::failure("Invalid selection. Exiting.", color),
        SendOutcome::WriteFailed { reason, .. } => {
            style::failure(&format!("Failed to send payload: {}", reason), color)
        }
        SendOutcome::RetriesExhausted { .. } => style::failure(
            "Max retries reached. Could not connect to the device.",
            color,
        ),
    };
    console.say(line)?;
    Ok(())
}
