//! Domain models for thermwatch
//!
//! Readings, sensor identifiers and display naming.

pub mod naming;
pub mod reading;

pub use naming::FriendlyNames;
pub use reading::{Reading, SensorId, TemperatureUnit};
