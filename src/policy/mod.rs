//! Threshold policy
//!
//! Resolves a sensor id to the temperature above which it is considered
//! in breach. Rules are tested in order against the lowercased id and the
//! first match wins; ids no rule matches get the default threshold.

mod config;
mod rules;

pub use config::{PolicyConfig, ThresholdRuleConfig};
pub use rules::{builtin_rules, SensorPattern, ThresholdRule, DEFAULT_THRESHOLD};

/// Outcome of classifying a sensor id
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification<'a> {
    /// Name of the matching rule, `None` when the default applied
    pub rule: Option<&'a str>,
    /// Resolved threshold
    pub threshold: f64,
}

/// Ordered first-match threshold policy
#[derive(Debug, Clone)]
pub struct ThresholdPolicy {
    rules: Vec<ThresholdRule>,
    default_threshold: f64,
}

impl ThresholdPolicy {
    /// Create a policy from ordered rules and a default threshold
    pub fn new(rules: Vec<ThresholdRule>, default_threshold: f64) -> Self {
        Self {
            rules,
            default_threshold,
        }
    }

    /// Classify a sensor id, reporting which rule matched
    pub fn classify(&self, sensor_id: &str) -> Classification<'_> {
        let id_lower = sensor_id.to_lowercase();

        self.rules
            .iter()
            .find(|rule| rule.pattern.matches_lowercase(&id_lower))
            .map(|rule| Classification {
                rule: Some(rule.name.as_str()),
                threshold: rule.threshold,
            })
            .unwrap_or(Classification {
                rule: None,
                threshold: self.default_threshold,
            })
    }

    /// Threshold for a sensor id
    pub fn threshold_for(&self, sensor_id: &str) -> f64 {
        self.classify(sensor_id).threshold
    }

    /// Rules in evaluation order
    pub fn rules(&self) -> &[ThresholdRule] {
        &self.rules
    }

    /// Threshold used when no rule matches
    pub fn default_threshold(&self) -> f64 {
        self.default_threshold
    }
}

impl Default for ThresholdPolicy {
    fn default() -> Self {
        Self::new(builtin_rules(), DEFAULT_THRESHOLD)
    }
}
