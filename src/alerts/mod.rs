//! Alert and notification system
//!
//! Threshold breaches become notifications, rate-limited per sensor by a
//! cooldown that survives restarts through the persisted alert state.

mod engine;
mod notifier;
mod state;
mod types;

pub use engine::{AlertEngine, DEFAULT_COOLDOWN};
pub use notifier::{DesktopNotifier, NotificationManager, Notifier, TerminalNotifier};
pub use state::{parse_timestamp, AlertState, AlertStateStore};
pub use types::{CycleReport, Notification, RaisedAlert, Severity, CRITICAL_OVERSHOOT};
