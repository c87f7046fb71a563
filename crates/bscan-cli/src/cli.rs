//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Output format for the scan command
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Scan options shared by `send` and `scan`
#[derive(Debug, Clone, Default, Args)]
pub struct ScanArgs {
    /// Scan duration in seconds [default: 5, or config]
    #[arg(short = 't', long, value_parser = clap::value_parser!(u64).range(1..))]
    pub scan_timeout: Option<u64>,
}

/// Options for the interactive scan, select and write pipeline
#[derive(Debug, Clone, Default, Args)]
pub struct SendArgs {
    #[command(flatten)]
    pub scan: ScanArgs,

    /// Connection timeout per attempt in seconds [default: 10, or config]
    #[arg(short = 'T', long, value_parser = clap::value_parser!(u64).range(1..))]
    pub connect_timeout: Option<u64>,

    /// Maximum number of connection attempts [default: 3, or config]
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    pub retries: Option<u32>,

    /// Do not print the banner
    #[arg(long)]
    pub no_banner: bool,
}

#[derive(Debug, Parser)]
#[command(name = "bscan")]
#[command(
    author,
    version,
    about = "Scan for BLE devices and write a payload to a writable characteristic",
    long_about = None,
    args_conflicts_with_subcommands = true
)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Use this config file instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Pipeline options when no subcommand is given
    #[command(flatten)]
    pub send: SendArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// The command to run; `send` when none was given.
    pub fn command(&self) -> Commands {
        self.command
            .clone()
            .unwrap_or_else(|| Commands::Send(self.send.clone()))
    }
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Scan, pick a device and write a payload (default)
    Send(SendArgs),

    /// Scan for nearby BLE devices and list them
    Scan {
        #[command(flatten)]
        scan: ScanArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}
