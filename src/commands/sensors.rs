//! Sensors command implementation
//!
//! Collects one batch and shows each reading against its threshold. Alert
//! state, storage and notifications are left untouched.

use crate::alerts::AlertStateStore;
use crate::cli::args::OutputFormat;
use crate::cli::output::{print_output, SensorTable};
use crate::config::Config;
use crate::domain::FriendlyNames;
use crate::error::Result;
use crate::services::Collector;
use crate::sources::build_sources;

/// Execute the sensors command
pub fn run_sensors(config: &Config, format: OutputFormat) -> Result<()> {
    let policy = config.policy.to_policy()?;
    let names = FriendlyNames::new().with_overrides(config.names.clone());
    let state = AlertStateStore::new(config.general.state_path()).load();

    let readings = Collector::new(build_sources(&config.sources)).collect();
    let table = SensorTable::build(&readings, &policy, &names, &state);

    print_output(&table, format)?;
    Ok(())
}
