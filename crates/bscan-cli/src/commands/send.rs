//! Send command implementation: the interactive pipeline on the real adapter.

use std::io::{self, BufReader, IsTerminal};

use anyhow::Result;
use btleplug::platform::Adapter;

use crate::cli::SendArgs;
use crate::config::{Config, resolve_scan_duration, resolve_send_options};
use crate::console::Console;
use crate::session::{SessionOutcome, SessionSettings, run_session};

pub async fn cmd_send(
    adapter: &Adapter,
    args: &SendArgs,
    config: &Config,
    color: bool,
    quiet: bool,
) -> Result<SessionOutcome> {
    let settings = SessionSettings {
        scan_duration: resolve_scan_duration(&args.scan, config),
        send: resolve_send_options(args, config),
        banner: config.banner && !args.no_banner && !quiet,
        spinner: !quiet && io::stderr().is_terminal(),
    };

    let mut console = Console::new(BufReader::new(io::stdin()), io::stdout()).with_color(color);

    // The same adapter handle runs the scan and opens the connection.
    run_session(adapter, adapter, &mut console, &settings).await
}
