//! Output formatting utilities
//!
//! Provides table and JSON output formatting for CLI commands.

use crate::alerts::{AlertState, CycleReport, RaisedAlert};
use crate::cli::args::OutputFormat;
use crate::domain::{FriendlyNames, Reading, SensorId};
use crate::policy::ThresholdPolicy;

use chrono::{DateTime, Local, Utc};
use serde::Serialize;
use std::io::{self, Write};

/// Format and print output based on the selected format
pub fn print_output<T: Serialize + TableDisplay>(data: &T, format: OutputFormat) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match format {
        OutputFormat::Table => {
            writeln!(handle, "{}", data.to_table())?;
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(data).map_err(io::Error::other)?;
            writeln!(handle, "{}", json)?;
        }
        OutputFormat::Compact => {
            writeln!(handle, "{}", data.to_compact())?;
        }
    }

    Ok(())
}

/// Trait for types that can be displayed as a table
pub trait TableDisplay {
    /// Format as a table string
    fn to_table(&self) -> String;

    /// Format as a compact single line
    fn to_compact(&self) -> String {
        self.to_table().replace('\n', " | ")
    }
}

fn local_time(at: &DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string()
}

/// One sensor line
#[derive(Debug, Clone, Serialize)]
pub struct SensorRow {
    pub sensor_id: SensorId,
    pub name: String,
    pub temperature: f64,
    pub threshold: f64,
    pub rule: Option<String>,
    pub over_threshold: bool,
    pub alerting: bool,
}

impl SensorRow {
    fn status(&self) -> &'static str {
        match (self.over_threshold, self.alerting) {
            (true, _) => "HOT",
            (false, true) => "ALERTING",
            (false, false) => "OK",
        }
    }
}

/// Readings with their resolved thresholds
#[derive(Debug, Clone, Serialize)]
pub struct SensorTable {
    pub sensors: Vec<SensorRow>,
}

impl SensorTable {
    /// Classify every reading against `policy`
    pub fn build(
        readings: &[Reading],
        policy: &ThresholdPolicy,
        names: &FriendlyNames,
        state: &AlertState,
    ) -> Self {
        let sensors = readings
            .iter()
            .map(|reading| {
                let classification = policy.classify(reading.id());
                SensorRow {
                    sensor_id: reading.sensor_id.clone(),
                    name: names.lookup(reading.id()),
                    temperature: reading.temperature,
                    threshold: classification.threshold,
                    rule: classification.rule.map(str::to_string),
                    over_threshold: reading.temperature > classification.threshold,
                    alerting: state.is_alerting(reading.id()),
                }
            })
            .collect();
        Self { sensors }
    }
}

impl TableDisplay for SensorTable {
    fn to_table(&self) -> String {
        if self.sensors.is_empty() {
            return "No temperature sensors found".to_string();
        }

        let mut output = String::from("  Sensor                          Temp      Limit     Status\n");
        output.push_str("  ──────────────────────────────────────────────────────────────\n");

        for row in &self.sensors {
            output.push_str(&format!(
                "  {:<31} {:<9} {:<9} {}\n",
                row.name,
                format!("{:.1}°C", row.temperature),
                format!("{:.1}°C", row.threshold),
                row.status()
            ));
        }

        output
    }

    fn to_compact(&self) -> String {
        self.sensors
            .iter()
            .map(|row| format!("{}={:.1}", row.sensor_id, row.temperature))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Result of one collection cycle
#[derive(Debug, Clone, Serialize)]
pub struct CycleOutput {
    pub started_at: DateTime<Utc>,
    pub sensors: SensorTable,
    pub alerts: CycleReport,
    pub stored: bool,
}

fn alert_line(alert: &RaisedAlert, names: &[SensorRow]) -> String {
    let label = names
        .iter()
        .find(|row| row.sensor_id == alert.sensor_id)
        .map(|row| row.name.as_str())
        .unwrap_or(alert.sensor_id.as_str());

    format!(
        "  ! {} {:.1}°C > {:.1}°C ({}{})\n",
        label,
        alert.temperature,
        alert.threshold,
        alert.severity,
        if alert.delivered { "" } else { ", not delivered" }
    )
}

impl TableDisplay for CycleOutput {
    fn to_table(&self) -> String {
        let mut output = format!(
            "Cycle at {}: {} readings\n\n",
            local_time(&self.started_at),
            self.sensors.sensors.len()
        );
        output.push_str(&self.sensors.to_table());

        if !self.alerts.raised.is_empty() {
            output.push_str("\n  Alerts:\n");
            for alert in &self.alerts.raised {
                output.push_str(&alert_line(alert, &self.sensors.sensors));
            }
        }
        if !self.alerts.suppressed.is_empty() {
            output.push_str(&format!(
                "\n  In cooldown: {}\n",
                self.alerts
                    .suppressed
                    .iter()
                    .map(SensorId::as_str)
                    .collect::<Vec<_>>()
                    .join(", ")
            ));
        }
        if !self.alerts.normalized.is_empty() {
            output.push_str(&format!(
                "\n  Back to normal: {}\n",
                self.alerts
                    .normalized
                    .iter()
                    .map(SensorId::as_str)
                    .collect::<Vec<_>>()
                    .join(", ")
            ));
        }

        output
    }

    fn to_compact(&self) -> String {
        format!(
            "{} readings, {} alerts, {} in cooldown, {} normalized",
            self.sensors.sensors.len(),
            self.alerts.raised.len(),
            self.alerts.suppressed.len(),
            self.alerts.normalized.len()
        )
    }
}

/// One threshold rule line
#[derive(Debug, Clone, Serialize)]
pub struct RuleRow {
    pub name: String,
    pub pattern: String,
    pub threshold: f64,
}

/// The ordered rule list
#[derive(Debug, Clone, Serialize)]
pub struct PolicyTable {
    pub rules: Vec<RuleRow>,
    pub default_threshold: f64,
}

impl From<&ThresholdPolicy> for PolicyTable {
    fn from(policy: &ThresholdPolicy) -> Self {
        Self {
            rules: policy
                .rules()
                .iter()
                .map(|rule| RuleRow {
                    name: rule.name.clone(),
                    pattern: rule.pattern.to_string(),
                    threshold: rule.threshold,
                })
                .collect(),
            default_threshold: policy.default_threshold(),
        }
    }
}

impl TableDisplay for PolicyTable {
    fn to_table(&self) -> String {
        let mut output = String::from("  #   Rule              Limit     Matches\n");
        output.push_str("  ──────────────────────────────────────────────────────────────\n");

        for (i, rule) in self.rules.iter().enumerate() {
            output.push_str(&format!(
                "  {:<3} {:<17} {:<9} {}\n",
                i + 1,
                rule.name,
                format!("{:.1}°C", rule.threshold),
                rule.pattern
            ));
        }
        output.push_str(&format!(
            "\n  Default: {:.1}°C\n",
            self.default_threshold
        ));

        output
    }

    fn to_compact(&self) -> String {
        self.rules
            .iter()
            .map(|r| format!("{}={:.0}", r.name, r.threshold))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Threshold resolved for one sensor id
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedThreshold {
    pub sensor_id: String,
    pub name: String,
    pub rule: Option<String>,
    pub threshold: f64,
}

/// Thresholds resolved for several ids
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedThresholds {
    pub sensors: Vec<ResolvedThreshold>,
}

impl TableDisplay for ResolvedThresholds {
    fn to_table(&self) -> String {
        let mut output = String::new();
        for sensor in &self.sensors {
            output.push_str(&format!(
                "{} ({})\n  Threshold: {:.1}°C via {}\n",
                sensor.sensor_id,
                sensor.name,
                sensor.threshold,
                sensor.rule.as_deref().unwrap_or("default")
            ));
        }
        output
    }

    fn to_compact(&self) -> String {
        self.sensors
            .iter()
            .map(|s| format!("{}={:.1}", s.sensor_id, s.threshold))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// One persisted alert entry
#[derive(Debug, Clone, Serialize)]
pub struct StateEntry {
    pub sensor_id: SensorId,
    pub name: String,
    pub last_alert: DateTime<Utc>,
}

/// Persisted alert state
#[derive(Debug, Clone, Serialize)]
pub struct StateTable {
    pub path: String,
    pub entries: Vec<StateEntry>,
}

impl StateTable {
    pub fn build(path: &std::path::Path, state: &AlertState, names: &FriendlyNames) -> Self {
        Self {
            path: path.display().to_string(),
            entries: state
                .iter()
                .map(|(id, at)| StateEntry {
                    sensor_id: id.clone(),
                    name: names.lookup(id.as_str()),
                    last_alert: *at,
                })
                .collect(),
        }
    }
}

impl TableDisplay for StateTable {
    fn to_table(&self) -> String {
        let mut output = format!("Alert state: {}\n", self.path);

        if self.entries.is_empty() {
            output.push_str("  No sensors alerting\n");
            return output;
        }

        for entry in &self.entries {
            output.push_str(&format!(
                "  {:<31} last alert {}\n",
                entry.name,
                local_time(&entry.last_alert)
            ));
        }
        output
    }

    fn to_compact(&self) -> String {
        format!("{} alerting", self.entries.len())
    }
}

/// Simple message output
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub message: String,
    pub success: bool,
}

impl TableDisplay for Message {
    fn to_table(&self) -> String {
        if self.success {
            format!("✓ {}", self.message)
        } else {
            format!("✗ {}", self.message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sensor_table_status() {
        let now = Utc::now();
        let mut state = AlertState::new();
        state.record(SensorId::new("thermal_thermal_zone0"), now);

        let table = SensorTable::build(
            &[
                Reading::celsius("nvidia_gpu_0", 90.0, now),
                Reading::celsius("thermal_thermal_zone0", 40.0, now),
                Reading::celsius("mystery_chip", 30.0, now),
            ],
            &ThresholdPolicy::default(),
            &FriendlyNames::new(),
            &state,
        );

        assert_eq!(table.sensors[0].status(), "HOT");
        assert_eq!(table.sensors[0].name, "NVIDIA GPU 1");
        assert_eq!(table.sensors[0].rule.as_deref(), Some("gpu_nvidia"));
        assert_eq!(table.sensors[1].status(), "ALERTING");
        assert_eq!(table.sensors[2].status(), "OK");
        assert_eq!(table.sensors[2].rule, None);
        assert!(table.to_table().contains("90.0°C"));
        assert_eq!(
            table.to_compact(),
            "nvidia_gpu_0=90.0, thermal_thermal_zone0=40.0, mystery_chip=30.0"
        );
    }

    #[test]
    fn test_policy_table_lists_rules_in_order() {
        let table = PolicyTable::from(&ThresholdPolicy::default());
        assert_eq!(table.rules[0].name, "cpu_control");
        assert_eq!(table.rules[0].pattern, "(k10temp | cpu) & tctl");
        assert!(table.to_table().contains("Default: 75.0°C"));
    }

    #[test]
    fn test_empty_state_table() {
        let table = StateTable::build(
            std::path::Path::new("/tmp/alert_state.json"),
            &AlertState::new(),
            &FriendlyNames::new(),
        );
        assert!(table.to_table().contains("No sensors alerting"));
    }

    #[test]
    fn test_message_display() {
        let msg = Message {
            message: "Alert state cleared".to_string(),
            success: true,
        };

        assert!(msg.to_table().starts_with('✓'));
    }
}
