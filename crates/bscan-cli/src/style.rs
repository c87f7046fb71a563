//! Visual styling utilities for the CLI.
//!
//! The banner, the scanning spinner and colored result lines. Every helper
//! takes a `color` flag so output stays plain under `--no-color`, `NO_COLOR`
//! or when stdout is not a terminal.

use std::io::IsTerminal;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;

/// Standard spinner tick characters (Braille dots animation)
const SPINNER_TICK_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// Standard spinner tick interval
const SPINNER_TICK_MS: u64 = 80;

const BANNER: &str = r"
     ____    ____
    | __ )  / ___|  ___ __ _ _ __
    |  _ \  \___ \ / __/ _` | '_ \
    | |_) |  ___) | (_| (_| | | | |
    |____/  |____/ \___\__,_|_| |_|

                           by linux
";

/// Whether stdout output should be colored.
pub fn use_color(no_color: bool) -> bool {
    !no_color && std::io::stdout().is_terminal()
}

/// The start-up banner.
pub fn banner(color: bool) -> String {
    if color {
        BANNER.blue().to_string()
    } else {
        BANNER.to_string()
    }
}

/// Get the standard spinner style.
fn spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars(SPINNER_TICK_CHARS)
}

/// Create a spinner on stderr for the discovery scan.
///
/// indicatif keeps the spinner hidden when stderr is not a terminal.
pub fn scanning_spinner(duration: Duration) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(spinner_style());
    pb.set_message(format!("Scanning... ({}s)", duration.as_secs()));
    pb.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
    pb
}

/// A line reporting success.
pub fn success(message: &str, color: bool) -> String {
    if color {
        message.green().to_string()
    } else {
        message.to_string()
    }
}

/// A line reporting a failure.
pub fn failure(message: &str, color: bool) -> String {
    if color {
        message.red().to_string()
    } else {
        message.to_string()
    }
}

/// A line reporting a recoverable problem.
pub fn warning(message: &str, color: bool) -> String {
    if color {
        message.yellow().to_string()
    } else {
        message.to_string()
    }
}
