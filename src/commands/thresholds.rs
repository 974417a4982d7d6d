//! Thresholds command implementation
//!
//! Prints the ordered rule table, or resolves the given sensor ids.

use crate::cli::args::OutputFormat;
use crate::cli::output::{print_output, PolicyTable, ResolvedThreshold, ResolvedThresholds};
use crate::config::Config;
use crate::domain::FriendlyNames;
use crate::error::Result;
use crate::policy::ThresholdPolicy;

/// Resolve each id to its threshold and matching rule
pub fn resolve(
    sensor_ids: &[String],
    policy: &ThresholdPolicy,
    names: &FriendlyNames,
) -> ResolvedThresholds {
    let sensors = sensor_ids
        .iter()
        .map(|id| {
            let classification = policy.classify(id);
            ResolvedThreshold {
                sensor_id: id.clone(),
                name: names.lookup(id),
                rule: classification.rule.map(str::to_string),
                threshold: classification.threshold,
            }
        })
        .collect();
    ResolvedThresholds { sensors }
}

/// Execute the thresholds command
pub fn run_thresholds(sensor_ids: &[String], config: &Config, format: OutputFormat) -> Result<()> {
    let policy = config.policy.to_policy()?;

    if sensor_ids.is_empty() {
        print_output(&PolicyTable::from(&policy), format)?;
    } else {
        let names = FriendlyNames::new().with_overrides(config.names.clone());
        print_output(&resolve(sensor_ids, &policy, &names), format)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_reports_rule() {
        let resolved = resolve(
            &["k10temp_Tctl_temp1".to_string(), "mystery".to_string()],
            &ThresholdPolicy::default(),
            &FriendlyNames::new(),
        );

        assert_eq!(resolved.sensors[0].rule.as_deref(), Some("cpu_control"));
        assert_eq!(resolved.sensors[0].threshold, 85.0);
        assert_eq!(resolved.sensors[0].name, "CPU Control Temperature");
        assert_eq!(resolved.sensors[1].rule, None);
        assert_eq!(resolved.sensors[1].threshold, 75.0);
    }
}
