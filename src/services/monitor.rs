//! Periodic collection loop
//!
//! Runs collection cycles back to back with a sleep in between. A cycle is
//! never interrupted: the shutdown flag is checked between cycles and while
//! sleeping.

use super::cycle::{CollectionCycle, CycleSummary};
use crate::error::AppError;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Configuration for the monitor
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Interval between cycle starts
    pub interval: Duration,
    /// Stop after this many cycles
    pub max_cycles: Option<u64>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
            max_cycles: None,
        }
    }
}

/// Collection loop monitor
pub struct Monitor {
    config: MonitorConfig,
    shutdown: Arc<AtomicBool>,
}

impl Monitor {
    /// Granularity of the shutdown check while sleeping
    const SLEEP_STEP: Duration = Duration::from_millis(200);

    /// Create a new monitor; setting `shutdown` stops it after the current cycle
    pub fn new(config: MonitorConfig, shutdown: Arc<AtomicBool>) -> Self {
        Self { config, shutdown }
    }

    /// Get the monitor configuration
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    fn stopping(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    /// Run the collection loop
    ///
    /// `on_cycle` sees every completed cycle. Returns the number of cycles
    /// run; a failed state write or a failing `on_cycle` ends the loop.
    pub fn run<F>(&self, cycle: &mut CollectionCycle, mut on_cycle: F) -> Result<u64, AppError>
    where
        F: FnMut(&CollectionCycle, &CycleSummary) -> Result<(), AppError>,
    {
        let mut completed = 0u64;

        while !self.stopping() {
            let started = Instant::now();
            let summary = cycle.run()?;
            completed += 1;
            on_cycle(&*cycle, &summary)?;

            if self.config.max_cycles.is_some_and(|max| completed >= max) {
                log::info!("Completed {} cycles; exiting", completed);
                break;
            }

            self.sleep_until(started + self.config.interval);
        }

        if self.stopping() {
            log::info!("Shutdown requested; stopped after {} cycles", completed);
        }
        Ok(completed)
    }

    fn sleep_until(&self, deadline: Instant) {
        loop {
            let now = Instant::now();
            if now >= deadline || self.stopping() {
                return;
            }
            std::thread::sleep((deadline - now).min(Self::SLEEP_STEP));
        }
    }
}
