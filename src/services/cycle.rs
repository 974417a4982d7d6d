//! One collection cycle
//!
//! Adapters -> merge -> alert engine, then storage, then the alert state
//! write. Adapter, notification and storage failures are logged; only a
//! failed state write ends the cycle with an error.

use super::collector::Collector;
use crate::alerts::{AlertEngine, AlertStateStore, CycleReport, NotificationManager, Notifier};
use crate::config::Config;
use crate::domain::{FriendlyNames, Reading};
use crate::error::Result;
use crate::sources::build_sources;
use crate::storage::{JsonLinesSink, ReadingSink};

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Outcome of one cycle
#[derive(Debug, Clone, Serialize)]
pub struct CycleSummary {
    /// Cycle start time
    pub started_at: DateTime<Utc>,
    /// Deduplicated batch
    pub readings: Vec<Reading>,
    /// Alert engine decisions
    pub alerts: CycleReport,
    /// Whether the batch reached the storage sink
    pub stored: bool,
}

/// Collection pipeline with its collaborators
pub struct CollectionCycle {
    collector: Collector,
    engine: AlertEngine,
    store: AlertStateStore,
    notifier: Box<dyn Notifier>,
    sink: Option<Box<dyn ReadingSink>>,
}

impl CollectionCycle {
    /// Create a cycle with notifications dropped and no storage
    pub fn new(collector: Collector, engine: AlertEngine, store: AlertStateStore) -> Self {
        Self {
            collector,
            engine,
            store,
            notifier: Box::new(NotificationManager::new()),
            sink: None,
        }
    }

    /// Builder: set the notification channel
    pub fn with_notifier(mut self, notifier: Box<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Builder: set the storage sink
    pub fn with_sink(mut self, sink: Option<Box<dyn ReadingSink>>) -> Self {
        self.sink = sink;
        self
    }

    /// Assemble the pipeline from configuration
    ///
    /// Fails when the policy is invalid or the alert state cannot be written.
    pub fn from_config(config: &Config) -> Result<Self> {
        let policy = config.policy.to_policy()?;
        let names = FriendlyNames::new().with_overrides(config.names.clone());

        let store = AlertStateStore::new(config.general.state_path());
        store.ensure_writable()?;

        let engine = AlertEngine::load(policy, names, config.general.cooldown(), &store);
        let collector = Collector::new(build_sources(&config.sources));

        let sink: Option<Box<dyn ReadingSink>> = if config.storage.enabled {
            Some(Box::new(JsonLinesSink::new(config.storage.path())))
        } else {
            None
        };

        log::debug!("Cycle sources: {}", collector.source_names().join(", "));

        Ok(Self::new(collector, engine, store)
            .with_notifier(Box::new(NotificationManager::from_config(&config.notify)))
            .with_sink(sink))
    }

    /// Alert engine, for inspection
    pub fn engine(&self) -> &AlertEngine {
        &self.engine
    }

    /// Run one cycle at the current time
    pub fn run(&mut self) -> Result<CycleSummary> {
        self.run_at(Utc::now())
    }

    /// Run one cycle with an explicit clock
    pub fn run_at(&mut self, now: DateTime<Utc>) -> Result<CycleSummary> {
        let readings = self.collector.collect();
        log::info!("Collected {} readings", readings.len());

        let alerts = self.engine.evaluate(&readings, now, self.notifier.as_ref());
        let stored = self.store_readings(&readings);

        self.engine.persist(&self.store)?;

        Ok(CycleSummary {
            started_at: now,
            readings,
            alerts,
            stored,
        })
    }

    fn store_readings(&self, readings: &[Reading]) -> bool {
        let Some(sink) = &self.sink else {
            return false;
        };

        if readings.is_empty() {
            log::warn!("No readings collected; nothing to store");
            return false;
        }

        match sink.append(readings) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("{}", e);
                false
            }
        }
    }
}
