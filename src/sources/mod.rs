//! Temperature source adapters
//!
//! Each adapter produces a list of readings and never fails: errors are
//! logged and reported as an empty list. Adapters share no state.

pub mod command;
pub mod gpu;
pub mod lm_sensors;
pub mod thermal_zone;

pub use command::{CommandRunner, SystemCommandRunner};
pub use gpu::{GpuProbe, GpuSource, NvmlProbe};
pub use lm_sensors::LmSensorsSource;
pub use thermal_zone::ThermalZoneSource;

use crate::config::SourcesConfig;
use crate::domain::Reading;
use crate::error::SourceError;

/// A source of temperature readings
pub trait TemperatureSource {
    /// Adapter name for logging
    fn name(&self) -> &str;

    /// Collect one batch of readings; empty on any failure
    fn collect(&self) -> Vec<Reading>;
}

/// Turn an adapter result into readings, logging the failure
pub(crate) fn recover(source: &str, result: Result<Vec<Reading>, SourceError>) -> Vec<Reading> {
    match result {
        Ok(readings) => readings,
        Err(e) => {
            log::warn!("{}: {}", source, e);
            Vec::new()
        }
    }
}

/// Build the enabled adapters in precedence order
///
/// The order is lm-sensors, thermal zones, GPU. Earlier adapters win when
/// two of them report the same sensor id.
pub fn build_sources(config: &SourcesConfig) -> Vec<Box<dyn TemperatureSource>> {
    let runner = SystemCommandRunner::new(config.command_timeout());
    let mut sources: Vec<Box<dyn TemperatureSource>> = Vec::new();

    if config.lm_sensors {
        sources.push(Box::new(LmSensorsSource::new(
            runner,
            config.sensors_command.clone(),
        )));
    }

    if config.thermal_zones {
        sources.push(Box::new(ThermalZoneSource::new(config.thermal_dir.clone())));
    }

    if config.gpu {
        let nvml: Option<Box<dyn GpuProbe>> = if config.nvml {
            Some(Box::new(NvmlProbe))
        } else {
            None
        };
        sources.push(Box::new(
            GpuSource::new(
                runner,
                config.sensors_command.clone(),
                config.nvidia_smi_command.clone(),
            )
            .with_nvml_probe(nvml),
        ));
    }

    sources
}
