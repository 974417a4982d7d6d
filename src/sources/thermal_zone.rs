//! Kernel thermal zone adapter
//!
//! Reads `<thermal_dir>/thermal_zone*/temp`, which holds milli-degrees Celsius.

use super::TemperatureSource;
use crate::domain::Reading;
use crate::error::SourceError;

use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};

const SOURCE_NAME: &str = "thermal-zones";
const ZONE_PREFIX: &str = "thermal_zone";
const TEMP_FILE: &str = "temp";

/// Thermal zone adapter
pub struct ThermalZoneSource {
    base_dir: PathBuf,
}

impl ThermalZoneSource {
    /// Create an adapter reading zones under `base_dir` (normally `/sys/class/thermal`)
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    fn try_collect(&self) -> Result<Vec<Reading>, SourceError> {
        let entries = fs::read_dir(&self.base_dir).map_err(|e| {
            SourceError::unavailable(SOURCE_NAME, format!("{}: {}", self.base_dir.display(), e))
        })?;

        let mut zones: Vec<(String, PathBuf)> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let name = entry.file_name().to_string_lossy().into_owned();
                let temp_file = entry.path().join(TEMP_FILE);
                (name.starts_with(ZONE_PREFIX) && temp_file.is_file()).then_some((name, temp_file))
            })
            .collect();
        zones.sort();

        let observed_at = Utc::now();
        let mut readings = Vec::with_capacity(zones.len());

        for (zone, temp_file) in zones {
            match read_millicelsius(&temp_file) {
                Ok(celsius) => {
                    readings.push(Reading::celsius(
                        format!("thermal_{}", zone),
                        celsius,
                        observed_at,
                    ));
                }
                Err(e) => log::warn!("Could not read {}: {}", temp_file.display(), e),
            }
        }

        Ok(readings)
    }
}

impl TemperatureSource for ThermalZoneSource {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    fn collect(&self) -> Vec<Reading> {
        super::recover(SOURCE_NAME, self.try_collect())
    }
}

/// Parse a sysfs temperature file into degrees Celsius
fn read_millicelsius(path: &Path) -> Result<f64, SourceError> {
    let content = fs::read_to_string(path).map_err(|e| SourceError::unavailable(SOURCE_NAME, e))?;
    let millis: i64 = content
        .trim()
        .parse()
        .map_err(|e| SourceError::parse(SOURCE_NAME, format!("'{}': {}", content.trim(), e)))?;
    Ok(millis as f64 / 1000.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn zone(dir: &TempDir, name: &str, content: &str) {
        let zone_dir = dir.path().join(name);
        fs::create_dir_all(&zone_dir).unwrap();
        fs::write(zone_dir.join("temp"), content).unwrap();
    }

    #[test]
    fn test_reads_millicelsius() {
        let dir = TempDir::new().unwrap();
        zone(&dir, "thermal_zone0", "45000\n");

        let readings = ThermalZoneSource::new(dir.path()).collect();
        assert_eq!(readings.len(), 1);
        assert_eq!(readings[0].id(), "thermal_thermal_zone0");
        assert_eq!(readings[0].temperature, 45.0);
    }

    #[test]
    fn test_zones_sorted_and_bad_files_skipped() {
        let dir = TempDir::new().unwrap();
        zone(&dir, "thermal_zone2", "51500");
        zone(&dir, "thermal_zone0", "garbage");
        zone(&dir, "thermal_zone1", "-5000");
        fs::create_dir_all(dir.path().join("cooling_device0")).unwrap();
        fs::create_dir_all(dir.path().join("thermal_zone3")).unwrap();

        let readings = ThermalZoneSource::new(dir.path()).collect();
        let pairs: Vec<(&str, f64)> = readings.iter().map(|r| (r.id(), r.temperature)).collect();
        assert_eq!(
            pairs,
            vec![("thermal_thermal_zone1", -5.0), ("thermal_thermal_zone2", 51.5)]
        );
    }

    #[test]
    fn test_missing_base_dir_yields_empty() {
        let readings = ThermalZoneSource::new("/nonexistent/thermal").collect();
        assert!(readings.is_empty());
    }
}
