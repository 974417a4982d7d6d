//! Collect and watch command implementation
//!
//! Runs the collection pipeline once, or on an interval until interrupted.

use crate::cli::args::{OutputFormat, WatchArgs};
use crate::cli::output::{print_output, CycleOutput, SensorTable};
use crate::config::Config;
use crate::error::Result;
use crate::services::{CollectionCycle, CycleSummary, Monitor, MonitorConfig};

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

fn cycle_output(cycle: &CollectionCycle, summary: &CycleSummary) -> CycleOutput {
    let engine = cycle.engine();
    CycleOutput {
        started_at: summary.started_at,
        sensors: SensorTable::build(
            &summary.readings,
            engine.policy(),
            engine.names(),
            engine.state(),
        ),
        alerts: summary.alerts.clone(),
        stored: summary.stored,
    }
}

/// Execute the collect command
pub fn run_collect(config: &Config, format: OutputFormat) -> Result<()> {
    let mut cycle = CollectionCycle::from_config(config)?;
    let summary = cycle.run()?;

    print_output(&cycle_output(&cycle, &summary), format)?;
    Ok(())
}

/// Execute the watch command
pub fn run_watch(
    args: &WatchArgs,
    config: &Config,
    format: OutputFormat,
    shutdown: Arc<AtomicBool>,
) -> Result<()> {
    let mut cycle = CollectionCycle::from_config(config)?;

    let monitor_config = MonitorConfig {
        interval: Duration::from_secs(config.general.interval_seconds.max(1)),
        max_cycles: args.count,
    };

    log::info!("Starting collection loop");
    log::info!("  Interval: {:?}", monitor_config.interval);
    log::info!("  Cooldown: {:?}", config.general.cooldown());
    log::info!("  State file: {}", config.general.state_path().display());

    let monitor = Monitor::new(monitor_config, shutdown);
    let completed = monitor.run(&mut cycle, |cycle, summary| {
        print_output(&cycle_output(cycle, summary), format)?;
        Ok(())
    })?;

    log::info!("Collection loop finished after {} cycles", completed);
    Ok(())
}
