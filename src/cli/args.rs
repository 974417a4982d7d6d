//! CLI argument definitions using clap derive
//!
//! Defines all command-line arguments and subcommands.

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

/// Hardware temperature collector with threshold alerts
///
/// Samples lm-sensors, kernel thermal zones and GPUs, and raises
/// cooldown-throttled alerts for sensors above their threshold.
#[derive(Parser, Debug)]
#[command(name = "thermwatch")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "THERMWATCH_CONFIG")]
    pub config: Option<String>,

    /// Alert state file (overrides the config file)
    #[arg(long, global = true, value_name = "PATH")]
    pub state_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one collection cycle
    Collect(CollectArgs),

    /// Run collection cycles until interrupted
    Watch(WatchArgs),

    /// Show current readings with thresholds, without alerting
    Sensors,

    /// Show the threshold rules, or resolve sensor ids
    Thresholds {
        /// Sensor ids to resolve
        sensor_ids: Vec<String>,
    },

    /// Show or clear the persisted alert state
    State {
        /// Remove every entry
        #[arg(long)]
        clear: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Arguments for the collect command
#[derive(Parser, Debug, Default)]
pub struct CollectArgs {
    /// Do not deliver notifications (alert state is still updated)
    #[arg(long)]
    pub no_notify: bool,

    /// Do not append readings to storage
    #[arg(long)]
    pub no_store: bool,
}

/// Arguments for the watch command
#[derive(Parser, Debug)]
pub struct WatchArgs {
    /// Seconds between cycles (overrides the config file)
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: Option<u64>,

    /// Exit after this many cycles
    #[arg(long)]
    pub count: Option<u64>,

    #[command(flatten)]
    pub collect: CollectArgs,
}

/// Output format
#[derive(ValueEnum, Debug, Clone, Copy, Default)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format for machine parsing
    Json,
    /// Compact single-line format
    Compact,
}

/// Generate shell completions and print to stdout
pub fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
}
