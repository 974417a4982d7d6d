//! thermwatch - hardware temperature collection and alerting library
//!
//! This library samples temperature sensors from lm-sensors, kernel thermal
//! zones and GPUs, classifies readings against a threshold policy, and
//! raises cooldown-throttled alerts.
//!
//! # Modules
//!
//! - [`alerts`]: Alert engine, persisted alert state, notifiers
//! - [`cli`]: Command-line interface definitions
//! - [`commands`]: Command handlers
//! - [`config`]: Configuration system
//! - [`domain`]: Readings, sensor ids and friendly names
//! - [`error`]: Error types
//! - [`policy`]: Ordered first-match threshold rules
//! - [`services`]: Collection cycle and periodic loop
//! - [`sources`]: Temperature source adapters
//! - [`storage`]: Reading sinks

pub mod alerts;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod error;
pub mod policy;
pub mod services;
pub mod sources;
pub mod storage;

#[cfg(test)]
pub mod mock;

pub use error::{AppError, Result};
