//! Temperature reading types
//!
//! A [`Reading`] is one normalized sample produced by a source adapter.
//! It lives for a single collection cycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Canonical sensor identifier
///
/// Built by the adapters from source-specific fields, e.g.
/// `k10temp-pci-00c3_Tctl_temp1` or `thermal_thermal_zone0`. It is the
/// dedup key and the key for threshold lookup.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SensorId(String);

impl SensorId {
    /// Create a sensor id from any string
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the id as a string slice
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SensorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SensorId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for SensorId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SensorId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for SensorId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Temperature unit
///
/// Every adapter converts to Celsius before emitting a reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TemperatureUnit {
    #[default]
    #[serde(rename = "C")]
    Celsius,
}

impl fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Celsius => write!(f, "°C"),
        }
    }
}

/// One normalized temperature sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Canonical sensor id
    pub sensor_id: SensorId,
    /// Measured temperature
    pub temperature: f64,
    /// Unit of `temperature`
    pub unit: TemperatureUnit,
    /// When the adapter took the sample
    pub observed_at: DateTime<Utc>,
}

impl Reading {
    /// Create a Celsius reading
    pub fn celsius(
        sensor_id: impl Into<SensorId>,
        temperature: f64,
        observed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            sensor_id: sensor_id.into(),
            temperature,
            unit: TemperatureUnit::Celsius,
            observed_at,
        }
    }

    /// Sensor id as a string slice
    pub fn id(&self) -> &str {
        self.sensor_id.as_str()
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {:.1}{}", self.sensor_id, self.temperature, self.unit)
    }
}
