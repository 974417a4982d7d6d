//! Threshold policy configuration
//!
//! TOML-friendly form of the policy. Example:
//!
//! ```toml
//! [policy]
//! default_threshold = 75.0
//!
//! [policy.thresholds]
//! cpu_control = 80.0
//!
//! [[policy.rules]]
//! name = "cpu_control"
//! markers = [["k10temp", "cpu"], ["tctl"]]
//! threshold = 85.0
//! ```

use super::rules::{builtin_rules, SensorPattern, ThresholdRule, DEFAULT_THRESHOLD};
use super::ThresholdPolicy;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Policy section of the configuration file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Threshold for sensors no rule matches
    pub default_threshold: f64,
    /// Per-rule threshold overrides, keyed by rule name
    pub thresholds: BTreeMap<String, f64>,
    /// Full rule list; replaces the built-in rules when non-empty
    pub rules: Vec<ThresholdRuleConfig>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            default_threshold: DEFAULT_THRESHOLD,
            thresholds: BTreeMap::new(),
            rules: Vec::new(),
        }
    }
}

/// Rule entry (TOML-friendly format)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdRuleConfig {
    /// Rule name
    pub name: String,
    /// Marker groups; every group needs one marker present in the id
    pub markers: Vec<Vec<String>>,
    /// Threshold in Celsius
    pub threshold: f64,
}

impl ThresholdRuleConfig {
    fn to_rule(&self, position: usize) -> Result<ThresholdRule, ConfigError> {
        let key = |field: &str| format!("policy.rules[{}].{}", position, field);

        if self.name.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: key("name"),
                message: "rule name must not be empty".to_string(),
            });
        }

        let groups: Vec<Vec<String>> = self
            .markers
            .iter()
            .map(|group| {
                group
                    .iter()
                    .map(|m| m.trim().to_string())
                    .filter(|m| !m.is_empty())
                    .collect::<Vec<_>>()
            })
            .collect();

        if groups.is_empty() || groups.iter().any(Vec::is_empty) {
            return Err(ConfigError::InvalidValue {
                key: key("markers"),
                message: format!("rule '{}' needs non-empty marker groups", self.name),
            });
        }

        check_threshold(&key("threshold"), self.threshold)?;

        Ok(ThresholdRule::new(
            self.name.clone(),
            SensorPattern::from_groups(groups),
            self.threshold,
        ))
    }
}

impl PolicyConfig {
    /// Build the threshold policy
    pub fn to_policy(&self) -> Result<ThresholdPolicy, ConfigError> {
        check_threshold("policy.default_threshold", self.default_threshold)?;

        let mut rules = if self.rules.is_empty() {
            builtin_rules()
        } else {
            self.rules
                .iter()
                .enumerate()
                .map(|(i, r)| r.to_rule(i))
                .collect::<Result<Vec<_>, _>>()?
        };

        for (name, threshold) in &self.thresholds {
            let key = format!("policy.thresholds.{}", name);
            check_threshold(&key, *threshold)?;

            let mut found = false;
            for rule in rules.iter_mut().filter(|r| &r.name == name) {
                rule.threshold = *threshold;
                found = true;
            }

            if !found {
                return Err(ConfigError::InvalidValue {
                    key,
                    message: format!("no threshold rule named '{}'", name),
                });
            }
        }

        Ok(ThresholdPolicy::new(rules, self.default_threshold))
    }
}

fn check_threshold(key: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("threshold must be a finite number, got {}", value),
        })
    }
}
