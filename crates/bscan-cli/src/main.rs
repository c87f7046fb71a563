use std::io;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use bscan_cli::cli::{Cli, Commands};
use bscan_cli::commands::{cmd_scan, cmd_send};
use bscan_cli::config::{Config, resolve_scan_duration};
use bscan_cli::style;
use bscan_core::scan;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command();

    // Handle completions command early (before tracing init)
    if let Commands::Completions { shell } = command {
        let mut cmd = <Cli as CommandFactory>::command();
        clap_complete::generate(shell, &mut cmd, "bscan", &mut io::stdout());
        return Ok(());
    }

    // Logs go to stderr and stay at warn by default so they do not break up
    // the prompts on stdout.
    let filter = if cli.quiet {
        EnvFilter::new("warn")
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    let color = style::use_color(cli.no_color || config.no_color);

    let adapter = scan::get_adapter()
        .await
        .context("Failed to find a Bluetooth adapter")?;

    match command {
        Commands::Send(args) => {
            let outcome = cmd_send(&adapter, &args, &config, color, cli.quiet).await?;
            tracing::debug!("Session ended: {:?}", outcome);
        }
        Commands::Scan { scan, format } => {
            let duration = resolve_scan_duration(&scan, &config);
            cmd_scan(&adapter, duration, format, cli.quiet, &mut io::stdout()).await?;
        }
        Commands::Completions { .. } => {
            // Already handled above
            unreachable!()
        }
    }

    Ok(())
}
