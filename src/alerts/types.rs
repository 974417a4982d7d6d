//! Alert system domain types
//!
//! Severity, the notification payload, and the per-cycle evaluation report.

use crate::domain::SensorId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Overshoot above which an alert is critical, in Celsius
pub const CRITICAL_OVERSHOOT: f64 = 10.0;

/// Alert severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Over threshold by at most [`CRITICAL_OVERSHOOT`]
    Normal,
    /// Over threshold by more than [`CRITICAL_OVERSHOOT`]
    Critical,
}

impl Severity {
    /// Severity for a reading `overshoot` degrees above its threshold
    pub fn for_overshoot(overshoot: f64) -> Self {
        if overshoot > CRITICAL_OVERSHOOT {
            Self::Critical
        } else {
            Self::Normal
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal => write!(f, "normal"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

/// Message handed to the notification sink
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    /// Sensor that breached
    pub sensor_id: SensorId,
    /// Short title
    pub title: String,
    /// Body with value, threshold and overshoot
    pub body: String,
    /// Urgency
    pub severity: Severity,
}

impl Notification {
    /// Build the notification for a threshold breach
    pub fn breach(sensor_id: &SensorId, label: &str, temperature: f64, threshold: f64) -> Self {
        let overshoot = temperature - threshold;
        Self {
            sensor_id: sensor_id.clone(),
            title: format!("Temperature alert - {}", label),
            body: format!(
                "Current temperature: {:.1}°C\nThreshold: {:.1}°C\nOver threshold by: {:.1}°C",
                temperature, threshold, overshoot
            ),
            severity: Severity::for_overshoot(overshoot),
        }
    }
}

/// An alert raised during a cycle
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RaisedAlert {
    pub sensor_id: SensorId,
    pub temperature: f64,
    pub threshold: f64,
    pub severity: Severity,
    /// Whether any notification channel accepted it
    pub delivered: bool,
}

/// What the alert engine did in one cycle
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CycleReport {
    /// Breaches that triggered a notification
    pub raised: Vec<RaisedAlert>,
    /// Breaches still inside the cooldown window
    pub suppressed: Vec<SensorId>,
    /// Sensors that went back to or below their threshold
    pub normalized: Vec<SensorId>,
}

impl CycleReport {
    /// Number of raised alerts whose delivery failed
    pub fn failed_deliveries(&self) -> usize {
        self.raised.iter().filter(|a| !a.delivered).count()
    }
}
