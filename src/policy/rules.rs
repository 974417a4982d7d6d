//! Threshold rule types
//!
//! A rule pairs a sensor-id pattern with a temperature threshold.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Substring pattern over lowercased sensor ids
///
/// The pattern is a list of marker groups. It matches when every group has
/// at least one marker that occurs in the id. `[["k10temp", "cpu"], ["tctl"]]`
/// reads as "(k10temp or cpu) and tctl".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SensorPattern {
    groups: Vec<Vec<String>>,
}

impl SensorPattern {
    /// Pattern matching any one of the markers
    pub fn any_of(markers: &[&str]) -> Self {
        Self::from_groups(vec![markers.iter().map(|m| m.to_string()).collect()])
    }

    /// Build a pattern from marker groups; markers are lowercased
    pub fn from_groups(groups: Vec<Vec<String>>) -> Self {
        let groups = groups
            .into_iter()
            .map(|group| group.into_iter().map(|m| m.to_lowercase()).collect())
            .collect();
        Self { groups }
    }

    /// Additionally require one of `markers`
    pub fn and_any_of(mut self, markers: &[&str]) -> Self {
        self.groups
            .push(markers.iter().map(|m| m.to_lowercase()).collect());
        self
    }

    /// Test an already lowercased sensor id
    pub fn matches_lowercase(&self, id_lower: &str) -> bool {
        !self.groups.is_empty()
            && self
                .groups
                .iter()
                .all(|group| group.iter().any(|marker| id_lower.contains(marker.as_str())))
    }

    /// Test a sensor id, ignoring case
    pub fn matches(&self, sensor_id: &str) -> bool {
        self.matches_lowercase(&sensor_id.to_lowercase())
    }

    /// Marker groups of this pattern
    pub fn groups(&self) -> &[Vec<String>] {
        &self.groups
    }
}

impl fmt::Display for SensorPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let groups: Vec<String> = self
            .groups
            .iter()
            .map(|group| {
                if group.len() == 1 {
                    group[0].clone()
                } else {
                    format!("({})", group.join(" | "))
                }
            })
            .collect();
        f.write_str(&groups.join(" & "))
    }
}

/// One ordered threshold rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdRule {
    /// Rule name, used for overrides and display
    pub name: String,
    /// Pattern the sensor id must match
    pub pattern: SensorPattern,
    /// Threshold in Celsius; readings above it are breaches
    pub threshold: f64,
}

impl ThresholdRule {
    /// Create a new rule
    pub fn new(name: impl Into<String>, pattern: SensorPattern, threshold: f64) -> Self {
        Self {
            name: name.into(),
            pattern,
            threshold,
        }
    }
}

/// Default threshold when no rule matches
pub const DEFAULT_THRESHOLD: f64 = 75.0;

/// Built-in rule list, in evaluation order
///
/// CPU rules come first so ids such as `cpu_thermal` resolve through the CPU
/// group rather than the generic thermal rule.
pub fn builtin_rules() -> Vec<ThresholdRule> {
    let cpu = || SensorPattern::any_of(&["k10temp", "cpu"]);

    vec![
        ThresholdRule::new("cpu_control", cpu().and_any_of(&["tctl"]), 85.0),
        ThresholdRule::new("cpu_core", cpu().and_any_of(&["tccd", "core"]), 90.0),
        ThresholdRule::new("cpu_general", cpu(), 85.0),
        ThresholdRule::new("gpu_nvidia", SensorPattern::any_of(&["nvidia"]), 83.0),
        ThresholdRule::new(
            "gpu_amd",
            SensorPattern::any_of(&["amd"]).and_any_of(&["gpu"]),
            90.0,
        ),
        ThresholdRule::new("nvme_ssd", SensorPattern::any_of(&["nvme"]), 75.0),
        ThresholdRule::new("ssd_general", SensorPattern::any_of(&["ssd"]), 70.0),
        ThresholdRule::new(
            "network_wifi",
            SensorPattern::any_of(&["wifi", "iwlwifi"]),
            75.0,
        ),
        ThresholdRule::new(
            "network_ethernet",
            SensorPattern::any_of(&["ethernet", "r8169"]),
            80.0,
        ),
        ThresholdRule::new("system_thermal", SensorPattern::any_of(&["thermal"]), 70.0),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_requires_every_group() {
        let pattern = SensorPattern::any_of(&["amd"]).and_any_of(&["gpu"]);
        assert!(pattern.matches("amd_gpu"));
        assert!(pattern.matches("amdgpu-pci-0300_edge_temp1"));
        assert!(!pattern.matches("amd_radeon"));
        assert!(pattern.matches("AMD_GPU"));
        assert!(!pattern.matches("amd_cpu"));
    }

    #[test]
    fn test_pattern_markers_are_lowercased() {
        let pattern = SensorPattern::any_of(&["Tctl"]);
        assert!(pattern.matches("k10temp_TCTL_temp1"));
    }

    #[test]
    fn test_empty_pattern_never_matches() {
        let pattern = SensorPattern::from_groups(vec![]);
        assert!(!pattern.matches("anything"));
    }

    #[test]
    fn test_pattern_display() {
        let pattern = SensorPattern::any_of(&["k10temp", "cpu"]).and_any_of(&["tctl"]);
        assert_eq!(pattern.to_string(), "(k10temp | cpu) & tctl");
    }

    #[test]
    fn test_builtin_rule_order() {
        let names: Vec<_> = builtin_rules().into_iter().map(|r| r.name).collect();
        assert_eq!(names.first().map(String::as_str), Some("cpu_control"));
        assert_eq!(names.last().map(String::as_str), Some("system_thermal"));
        assert_eq!(names.len(), 10);
    }
}
