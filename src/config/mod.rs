//! Configuration system
//!
//! Handles TOML config file parsing and CLI argument merging.

pub mod builder;
pub mod file;

pub use builder::ConfigBuilder;
pub use file::ConfigFile;

use crate::policy::PolicyConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,
    /// Temperature source settings
    pub sources: SourcesConfig,
    /// Threshold policy
    pub policy: PolicyConfig,
    /// Notification settings
    pub notify: NotifyConfig,
    /// Reading storage settings
    pub storage: StorageConfig,
    /// Extra friendly names, sensor id -> label
    pub names: BTreeMap<String, String>,
}

/// General configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Enable verbose logging
    pub verbose: bool,
    /// Interval between cycles in `watch` mode, in seconds
    pub interval_seconds: u64,
    /// Minimum time between two alerts for the same sensor, in seconds
    pub cooldown_seconds: u64,
    /// Alert state file; defaults to the user data directory
    pub state_path: Option<PathBuf>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            interval_seconds: 60,
            cooldown_seconds: 300,
            state_path: None,
        }
    }
}

impl GeneralConfig {
    /// Cooldown window as a Duration
    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_seconds)
    }

    /// Resolved alert state file path
    pub fn state_path(&self) -> PathBuf {
        self.state_path
            .clone()
            .unwrap_or_else(|| data_file("alert_state.json"))
    }
}

/// Temperature source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// Read lm-sensors JSON output
    pub lm_sensors: bool,
    /// Read kernel thermal zones
    pub thermal_zones: bool,
    /// Probe GPUs (NVML / nvidia-smi and amdgpu)
    pub gpu: bool,
    /// Try NVML before falling back to nvidia-smi
    pub nvml: bool,
    /// lm-sensors executable
    pub sensors_command: String,
    /// nvidia-smi executable
    pub nvidia_smi_command: String,
    /// Thermal class directory
    pub thermal_dir: PathBuf,
    /// Per-command timeout in milliseconds
    pub command_timeout_ms: u64,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            lm_sensors: true,
            thermal_zones: true,
            gpu: true,
            nvml: true,
            sensors_command: "sensors".to_string(),
            nvidia_smi_command: "nvidia-smi".to_string(),
            thermal_dir: PathBuf::from("/sys/class/thermal"),
            command_timeout_ms: 5000,
        }
    }
}

impl SourcesConfig {
    /// Command timeout as a Duration
    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }
}

/// Notification channel kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotifierKind {
    /// notify-send, then zenity
    Desktop,
    /// stderr
    Terminal,
}

/// Notification configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    /// Whether alerts are delivered at all
    pub enabled: bool,
    /// Channels, tried in order until one delivers
    pub channels: Vec<NotifierKind>,
    /// Application name shown by the desktop notifier
    pub app_name: String,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            channels: vec![NotifierKind::Desktop],
            app_name: "Temperature Monitor".to_string(),
        }
    }
}

/// Reading storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Append readings every cycle
    pub enabled: bool,
    /// JSON-lines file; defaults to the user data directory
    pub path: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: None,
        }
    }
}

impl StorageConfig {
    /// Resolved readings file path
    pub fn path(&self) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(|| data_file("readings.jsonl"))
    }
}

fn data_file(name: &str) -> PathBuf {
    match dirs::data_local_dir() {
        Some(dir) => dir.join("thermwatch").join(name),
        None => PathBuf::from(name),
    }
}
