//! Service layer for the collection pipeline
//!
//! Services wire adapters, the alert engine and the sinks into collection
//! cycles, and run those cycles on an interval.

pub mod collector;
pub mod cycle;
pub mod monitor;
pub mod normalize;

pub use collector::Collector;
pub use cycle::{CollectionCycle, CycleSummary};
pub use monitor::{Monitor, MonitorConfig};
pub use normalize::merge;
