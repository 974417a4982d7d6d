//! Persistent alert state
//!
//! Maps sensor id to the time of its last triggering notification. Stored
//! as a flat JSON object of ISO-8601 strings:
//!
//! ```json
//! { "k10temp-pci-00c3_Tctl_temp1": "2026-10-16T09:12:44.102+00:00" }
//! ```

use crate::domain::SensorId;
use crate::error::StateError;

use chrono::{DateTime, Local, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Sensor id -> last alert time
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlertState {
    entries: BTreeMap<SensorId, DateTime<Utc>>,
}

impl AlertState {
    /// Create an empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Last alert time for a sensor
    pub fn last_alert(&self, sensor_id: &str) -> Option<DateTime<Utc>> {
        self.entries.get(sensor_id).copied()
    }

    /// Whether a sensor is in the alerting state
    pub fn is_alerting(&self, sensor_id: &str) -> bool {
        self.entries.contains_key(sensor_id)
    }

    /// Record an alert for a sensor
    pub fn record(&mut self, sensor_id: SensorId, at: DateTime<Utc>) {
        self.entries.insert(sensor_id, at);
    }

    /// Drop a sensor, returning its last alert time
    pub fn clear_sensor(&mut self, sensor_id: &str) -> Option<DateTime<Utc>> {
        self.entries.remove(sensor_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries ordered by sensor id
    pub fn iter(&self) -> impl Iterator<Item = (&SensorId, &DateTime<Utc>)> {
        self.entries.iter()
    }

    fn to_json(&self) -> Value {
        let map = self
            .entries
            .iter()
            .map(|(id, at)| {
                (
                    id.to_string(),
                    Value::String(at.to_rfc3339_opts(SecondsFormat::Millis, false)),
                )
            })
            .collect();
        Value::Object(map)
    }

    /// Parse the persisted form; bad individual timestamps are dropped
    fn from_json(path: &Path, value: Value) -> Result<Self, StateError> {
        let Value::Object(map) = value else {
            return Err(StateError::Corrupt {
                path: path.to_path_buf(),
                reason: "expected a JSON object".to_string(),
            });
        };

        let mut state = Self::new();
        for (id, raw) in map {
            match raw.as_str().and_then(parse_timestamp) {
                Some(at) => state.record(SensorId::new(id), at),
                None => log::warn!("Dropping alert state for {}: bad timestamp {}", id, raw),
            }
        }
        Ok(state)
    }
}

/// Parse RFC 3339, or a naive ISO-8601 timestamp interpreted as local time
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Some(at.with_timezone(&Utc));
    }

    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").ok()?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|at| at.with_timezone(&Utc))
}

/// File-backed alert state side-channel
#[derive(Debug, Clone)]
pub struct AlertStateStore {
    path: PathBuf,
}

impl AlertStateStore {
    /// Create a store for `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// State file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "alert_state.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Check that the state can be written at all
    ///
    /// Creates the parent directory if needed. Failing here is the one
    /// fatal condition of a collection run.
    pub fn ensure_writable(&self) -> Result<(), StateError> {
        let io_err = |source| StateError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let probe = self.temp_path();
        OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&probe)
            .map_err(io_err)?;
        fs::remove_file(&probe).map_err(io_err)?;

        if self.path.exists() {
            OpenOptions::new().append(true).open(&self.path).map_err(io_err)?;
        }

        Ok(())
    }

    /// Load the state, strictly
    ///
    /// A missing file is an empty state; unreadable or malformed content is an error.
    pub fn try_load(&self) -> Result<AlertState, StateError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(AlertState::new()),
            Err(source) => {
                return Err(StateError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        if content.trim().is_empty() {
            return Ok(AlertState::new());
        }

        let value: Value = serde_json::from_str(&content).map_err(|e| StateError::Corrupt {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;

        AlertState::from_json(&self.path, value)
    }

    /// Load the state, starting empty when it cannot be read
    pub fn load(&self) -> AlertState {
        match self.try_load() {
            Ok(state) => {
                log::debug!(
                    "Loaded {} alert state entries from {}",
                    state.len(),
                    self.path.display()
                );
                state
            }
            Err(e) => {
                log::warn!("{}; starting with empty alert state", e);
                AlertState::new()
            }
        }
    }

    /// Replace the persisted state atomically
    pub fn save(&self, state: &AlertState) -> Result<(), StateError> {
        let io_err = |source| StateError::Io {
            path: self.path.clone(),
            source,
        };

        let content = serde_json::to_string_pretty(&state.to_json()).map_err(|e| {
            StateError::Corrupt {
                path: self.path.clone(),
                reason: e.to_string(),
            }
        })?;

        let temp_path = self.temp_path();
        let mut file = File::create(&temp_path).map_err(io_err)?;
        file.write_all(content.as_bytes()).map_err(io_err)?;
        file.write_all(b"\n").map_err(io_err)?;
        file.sync_all().map_err(io_err)?;
        drop(file);

        fs::rename(&temp_path, &self.path).map_err(io_err)?;
        log::debug!(
            "Saved {} alert state entries to {}",
            state.len(),
            self.path.display()
        );
        Ok(())
    }
}
