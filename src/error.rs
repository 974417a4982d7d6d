//! Unified error types for thermwatch
//!
//! This module defines all error types used throughout the application.
//! Uses thiserror for ergonomic error definitions.
//!
//! Only [`AppError`] ever reaches `main`. Source, delivery and storage
//! failures are recovered where they happen and end up as log lines.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from configuration parsing/validation
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Alert state could not be written (or its location is unusable)
    #[error("Alert state error: {0}")]
    State(#[from] StateError),

    /// Failed to install the interrupt handler
    #[error("Failed to install signal handler: {0}")]
    Signal(String),

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from temperature source adapters
///
/// These never leave an adapter: the adapter logs them and reports no readings.
#[derive(Error, Debug)]
pub enum SourceError {
    /// Backing tool or file is missing or failed
    #[error("{source_name} unavailable: {reason}")]
    Unavailable { source_name: String, reason: String },

    /// External command did not finish in time
    #[error("'{command}' timed out after {millis}ms")]
    Timeout { command: String, millis: u64 },

    /// Output could not be parsed
    #[error("Failed to parse {source_name} output: {reason}")]
    Parse { source_name: String, reason: String },
}

impl SourceError {
    pub(crate) fn unavailable(source_name: &str, reason: impl ToString) -> Self {
        Self::Unavailable {
            source_name: source_name.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn parse(source_name: &str, reason: impl ToString) -> Self {
        Self::Parse {
            source_name: source_name.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Notification delivery failure
#[derive(Error, Debug)]
pub enum DeliveryError {
    /// No usable notification transport on this system
    #[error("No notification transport available via {0}")]
    Unavailable(String),

    /// Transport exists but refused the notification
    #[error("Notification via {channel} failed: {reason}")]
    Failed { channel: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Reading persistence failure
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to write readings to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode reading: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Alert state side-channel errors
#[derive(Error, Debug)]
pub enum StateError {
    /// State file exists but its content is not a valid state map
    #[error("Alert state at {path} is corrupt: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    /// State file could not be read or written
    #[error("Alert state at {path} is not accessible: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from configuration parsing and validation
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file not found
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    /// Invalid config value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
