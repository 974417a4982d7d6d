//! lm-sensors adapter
//!
//! Runs `sensors -A -j` and walks the chip -> sub-sensor -> field tree.

use super::command::CommandRunner;
use super::TemperatureSource;
use crate::domain::Reading;
use crate::error::SourceError;

use chrono::{DateTime, Utc};
use serde_json::Value;

const SOURCE_NAME: &str = "lm-sensors";

/// Sub-sensor names that carry temperatures without saying "temp"
const TEMPERATURE_MARKERS: &[&str] = &["tctl", "tccd", "composite"];

const INPUT_SUFFIX: &str = "_input";

/// Unified sensor adapter backed by the `sensors` utility
pub struct LmSensorsSource<R: CommandRunner> {
    runner: R,
    command: String,
}

impl<R: CommandRunner> LmSensorsSource<R> {
    /// Create an adapter that invokes `command`
    pub fn new(runner: R, command: impl Into<String>) -> Self {
        Self {
            runner,
            command: command.into(),
        }
    }

    fn try_collect(&self) -> Result<Vec<Reading>, SourceError> {
        let output = self.runner.run(&self.command, &["-A", "-j"])?;
        let tree: Value =
            serde_json::from_str(&output).map_err(|e| SourceError::parse(SOURCE_NAME, e))?;

        if !tree.is_object() {
            return Err(SourceError::parse(SOURCE_NAME, "top level is not an object"));
        }

        Ok(parse_sensors_json(&tree, Utc::now()))
    }
}

impl<R: CommandRunner> TemperatureSource for LmSensorsSource<R> {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    fn collect(&self) -> Vec<Reading> {
        super::recover(SOURCE_NAME, self.try_collect())
    }
}

/// Extract temperature readings from `sensors -j` output
///
/// A field is a temperature sample when its name ends in `_input` and
/// either the field name contains `temp`, or the sub-sensor name contains
/// `temp` or one of the known temperature markers.
pub fn parse_sensors_json(tree: &Value, observed_at: DateTime<Utc>) -> Vec<Reading> {
    let mut readings = Vec::new();

    let Some(chips) = tree.as_object() else {
        return readings;
    };

    for (chip_name, chip) in chips {
        let Some(subsensors) = chip.as_object() else {
            continue;
        };

        for (subsensor_name, fields) in subsensors {
            if subsensor_name == "Adapter" {
                continue;
            }
            let Some(fields) = fields.as_object() else {
                continue;
            };

            let subsensor_lower = subsensor_name.to_lowercase();
            let subsensor_is_temp = subsensor_lower.contains("temp")
                || TEMPERATURE_MARKERS
                    .iter()
                    .any(|marker| subsensor_lower.contains(marker));

            for (field, value) in fields {
                let Some(channel) = field.strip_suffix(INPUT_SUFFIX) else {
                    continue;
                };
                let Some(temperature) = value.as_f64() else {
                    continue;
                };

                if field.contains("temp") || subsensor_is_temp {
                    let sensor_id = format!("{}_{}_{}", chip_name, subsensor_name, channel);
                    readings.push(Reading::celsius(sensor_id, temperature, observed_at));
                }
            }
        }
    }

    log::debug!("{}: parsed {} readings", SOURCE_NAME, readings.len());
    readings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockRunner;

    const SAMPLE: &str = r#"{
        "k10temp-pci-00c3": {
            "Adapter": "PCI adapter",
            "Tctl": { "temp1_input": 92.0 },
            "Tccd1": { "temp3_input": 70.25 }
        },
        "nvme-pci-0100": {
            "Adapter": "PCI adapter",
            "Composite": {
                "temp1_input": 44.85,
                "temp1_max": 81.85,
                "temp1_alarm": 0.0
            },
            "Sensor 1": { "temp2_input": 44.85 }
        },
        "amdgpu-pci-0300": {
            "Adapter": "PCI adapter",
            "vddgfx": { "in0_input": 0.95 },
            "edge": { "temp1_input": 51.0 },
            "PPT": { "power1_average": 30.0 }
        },
        "nct6798-isa-0290": {
            "Adapter": "ISA adapter",
            "SYSTIN": { "temp1_input": 33.0 },
            "fan1": { "fan1_input": 1200.0 },
            "intrusion0": { "intrusion0_alarm": 1.0 }
        },
        "acpi_fan-virtual-0": "unexpected"
    }"#;

    fn parse(json: &str) -> Vec<Reading> {
        let tree: Value = serde_json::from_str(json).unwrap();
        parse_sensors_json(&tree, Utc::now())
    }

    #[test]
    fn test_parse_k10temp_control_channel() {
        let readings = parse(r#"{"k10temp": {"Tctl": {"temp1_input": 92.0}}}"#);
        assert_eq!(readings.len(), 1);
        assert_eq!(readings[0].id(), "k10temp_Tctl_temp1");
        assert_eq!(readings[0].temperature, 92.0);
    }

    #[test]
    fn test_parse_filters_non_temperature_fields() {
        let ids: Vec<String> = parse(SAMPLE).iter().map(|r| r.id().to_string()).collect();
        assert_eq!(
            ids,
            vec![
                "k10temp-pci-00c3_Tctl_temp1",
                "k10temp-pci-00c3_Tccd1_temp3",
                "nvme-pci-0100_Composite_temp1",
                "nvme-pci-0100_Sensor 1_temp2",
                "amdgpu-pci-0300_edge_temp1",
                "nct6798-isa-0290_SYSTIN_temp1",
            ]
        );
    }

    #[test]
    fn test_marker_subsensor_accepts_non_temp_field() {
        let readings = parse(r#"{"chip": {"Composite": {"in1_input": 40.0}, "Vcore": {"in0_input": 1.2}}}"#);
        assert_eq!(readings.len(), 1);
        assert_eq!(readings[0].id(), "chip_Composite_in1");
    }

    #[test]
    fn test_non_numeric_values_skipped() {
        let readings = parse(r#"{"chip": {"temp": {"temp1_input": "hot", "temp2_input": null}}}"#);
        assert!(readings.is_empty());
    }

    #[test]
    fn test_collect_with_runner() {
        let runner = MockRunner::new().with_output("sensors", &["-A", "-j"], SAMPLE);
        let source = LmSensorsSource::new(&runner, "sensors");
        assert_eq!(source.collect().len(), 6);
    }

    #[test]
    fn test_collect_missing_tool_yields_empty() {
        let runner = MockRunner::new();
        let source = LmSensorsSource::new(&runner, "sensors");
        assert!(source.collect().is_empty());
    }

    #[test]
    fn test_collect_malformed_json_yields_empty() {
        let runner = MockRunner::new().with_output("sensors", &["-A", "-j"], "{ not json");
        let source = LmSensorsSource::new(&runner, "sensors");
        assert!(source.collect().is_empty());

        let runner = MockRunner::new().with_output("sensors", &["-A", "-j"], "[1, 2]");
        let source = LmSensorsSource::new(&runner, "sensors");
        assert!(source.collect().is_empty());
    }
}
