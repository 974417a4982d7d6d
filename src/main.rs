//! thermwatch - hardware temperature monitor
//!
//! A command-line tool that collects temperatures from lm-sensors, thermal
//! zones and GPUs and raises desktop alerts when sensors run hot.

use clap::Parser;
use thermwatch::cli::args::{generate_completions, Cli, CollectArgs, Commands};
use thermwatch::commands::{run_collect, run_sensors, run_state, run_thresholds, run_watch};
use thermwatch::config::{Config, ConfigBuilder};
use thermwatch::error::{AppError, ConfigError, StateError};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Run the appropriate command
    let result = run(&cli);

    if let Err(e) = result {
        // Config errors end the run before logging is set up
        init_logging(cli.verbose);
        log::error!("{}", e);
        print_error(&e);
        std::process::exit(1);
    }
}

/// Initialize logging once the verbosity is known
///
/// `RUST_LOG` still takes precedence over the verbose flag. Later calls are no-ops.
fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    let env = env_logger::Env::default().default_filter_or(default_filter);
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp_secs()
        .try_init();
}

/// Ctrl+C only raises the flag; an in-flight cycle still finishes and saves.
fn install_shutdown_handler() -> Result<Arc<AtomicBool>, AppError> {
    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = shutdown.clone();

    ctrlc::set_handler(move || {
        log::info!("Interrupt received; finishing current cycle");
        flag.store(true, Ordering::SeqCst);
    })
    .map_err(|e| AppError::Signal(e.to_string()))?;

    Ok(shutdown)
}

fn load_config(
    cli: &Cli,
    collect: Option<&CollectArgs>,
    interval: Option<u64>,
) -> Result<Config, AppError> {
    let mut builder = ConfigBuilder::new()
        .with_file(cli.config.as_deref())?
        .with_verbose(cli.verbose.then_some(true))
        .with_state_path(cli.state_path.clone())
        .with_interval(interval);

    if let Some(args) = collect {
        builder = builder
            .with_no_notify(args.no_notify)
            .with_no_store(args.no_store);
    }

    let config = builder.build();
    init_logging(config.general.verbose);
    Ok(config)
}

fn run(cli: &Cli) -> Result<(), AppError> {
    match &cli.command {
        Commands::Collect(args) => {
            let config = load_config(cli, Some(args), None)?;
            let _shutdown = install_shutdown_handler()?;
            run_collect(&config, cli.format)
        }

        Commands::Watch(args) => {
            let config = load_config(cli, Some(&args.collect), args.interval)?;
            let shutdown = install_shutdown_handler()?;
            run_watch(args, &config, cli.format, shutdown)
        }

        Commands::Sensors => run_sensors(&load_config(cli, None, None)?, cli.format),

        Commands::Thresholds { sensor_ids } => {
            run_thresholds(sensor_ids, &load_config(cli, None, None)?, cli.format)
        }

        Commands::State { clear } => {
            run_state(*clear, &load_config(cli, None, None)?, cli.format)
        }

        Commands::Completions { shell } => {
            init_logging(cli.verbose);
            generate_completions(*shell);
            Ok(())
        }
    }
}

fn print_error(err: &AppError) {
    eprintln!("Error: {}", err);

    // Print helpful hints for common errors
    match err {
        AppError::Config(ConfigError::TomlError(_) | ConfigError::InvalidValue { .. }) => {
            eprintln!();
            eprintln!("Hint: Check the configuration file passed with --config");
            eprintln!("      or found in ./thermwatch.toml, ~/.config/thermwatch/config.toml.");
        }
        AppError::State(StateError::Io { path, .. }) => {
            eprintln!();
            eprintln!(
                "Hint: The alert state file must be writable: {}",
                path.display()
            );
            eprintln!("      Use --state-path to choose another location.");
        }
        _ => {}
    }
}
