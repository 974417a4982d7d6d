//! Command handlers
//!
//! Each command handler orchestrates the execution of a CLI command.

pub mod collect;
pub mod sensors;
pub mod state;
pub mod thresholds;

pub use collect::{run_collect, run_watch};
pub use sensors::run_sensors;
pub use state::run_state;
pub use thresholds::run_thresholds;
