//! Alert engine
//!
//! Evaluates each reading against the threshold policy and decides whether a
//! breach raises a notification, given the cooldown window.
//!
//! Per sensor there are two states: Normal (absent from [`AlertState`]) and
//! Alerting (present, with the time of the last notification).
//!
//! - reading <= threshold: Alerting -> Normal, Normal stays Normal
//! - reading > threshold and no entry, or cooldown elapsed: notify, record `now`
//! - reading > threshold inside the cooldown: keep the old timestamp

use super::notifier::Notifier;
use super::state::{AlertState, AlertStateStore};
use super::types::{CycleReport, Notification, RaisedAlert};
use crate::domain::{FriendlyNames, Reading};
use crate::error::StateError;
use crate::policy::ThresholdPolicy;

use chrono::{DateTime, Utc};
use std::time::Duration;

/// Default minimum time between two alerts for one sensor
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(300);

/// Stateful alert evaluator
pub struct AlertEngine {
    policy: ThresholdPolicy,
    names: FriendlyNames,
    cooldown: Duration,
    state: AlertState,
}

impl AlertEngine {
    /// Create an engine with an explicit starting state
    pub fn new(
        policy: ThresholdPolicy,
        names: FriendlyNames,
        cooldown: Duration,
        state: AlertState,
    ) -> Self {
        Self {
            policy,
            names,
            cooldown,
            state,
        }
    }

    /// Create an engine whose state comes from `store`
    ///
    /// Unreadable state starts the engine empty.
    pub fn load(
        policy: ThresholdPolicy,
        names: FriendlyNames,
        cooldown: Duration,
        store: &AlertStateStore,
    ) -> Self {
        Self::new(policy, names, cooldown, store.load())
    }

    /// Current alert state
    pub fn state(&self) -> &AlertState {
        &self.state
    }

    /// Threshold policy in use
    pub fn policy(&self) -> &ThresholdPolicy {
        &self.policy
    }

    /// Label lookup used in notifications
    pub fn names(&self) -> &FriendlyNames {
        &self.names
    }

    /// Write the full state to `store`
    pub fn persist(&self, store: &AlertStateStore) -> Result<(), StateError> {
        store.save(&self.state)
    }

    /// Evaluate one cycle's readings at time `now`
    ///
    /// Notification failures are logged and do not stop evaluation.
    pub fn evaluate(
        &mut self,
        readings: &[Reading],
        now: DateTime<Utc>,
        notifier: &dyn Notifier,
    ) -> CycleReport {
        let mut report = CycleReport::default();

        for reading in readings {
            let id = reading.id();
            let temperature = reading.temperature;

            if !temperature.is_finite() {
                log::warn!("Ignoring non-finite reading for {}: {}", id, temperature);
                continue;
            }

            let threshold = self.policy.threshold_for(id);

            if temperature <= threshold {
                if self.state.clear_sensor(id).is_some() {
                    log::info!(
                        "Temperature normalized: {} = {:.1}°C",
                        self.names.lookup(id),
                        temperature
                    );
                    report.normalized.push(reading.sensor_id.clone());
                }
                continue;
            }

            let due = match self.state.last_alert(id) {
                None => true,
                Some(last) => self.cooldown_elapsed(last, now),
            };

            if !due {
                log::debug!("{} still over threshold, inside cooldown", id);
                report.suppressed.push(reading.sensor_id.clone());
                continue;
            }

            let label = self.names.lookup(id);
            let notification = Notification::breach(&reading.sensor_id, &label, temperature, threshold);

            log::warn!(
                "Temperature alert: {} = {:.1}°C (threshold: {:.1}°C)",
                label,
                temperature,
                threshold
            );

            let delivered = match notifier.notify(&notification) {
                Ok(()) => true,
                Err(e) => {
                    log::warn!("Alert for {} not delivered: {}", label, e);
                    false
                }
            };

            self.state.record(reading.sensor_id.clone(), now);
            report.raised.push(RaisedAlert {
                sensor_id: reading.sensor_id.clone(),
                temperature,
                threshold,
                severity: notification.severity,
                delivered,
            });
        }

        report
    }

    /// A timestamp in the future counts as no time elapsed
    fn cooldown_elapsed(&self, last: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(last)
            .to_std()
            .map(|elapsed| elapsed >= self.cooldown)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::Severity;
    use crate::domain::SensorId;
    use crate::mock::RecordingNotifier;
    use chrono::TimeDelta;
    use tempfile::TempDir;

    fn t0() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-10-16T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn engine() -> AlertEngine {
        AlertEngine::new(
            ThresholdPolicy::default(),
            FriendlyNames::new(),
            DEFAULT_COOLDOWN,
            AlertState::new(),
        )
    }

    fn reading(id: &str, temperature: f64) -> Reading {
        Reading::celsius(id, temperature, t0())
    }

    #[test]
    fn test_breach_raises_normal_severity() {
        let mut engine = engine();
        let notifier = RecordingNotifier::new();

        let report = engine.evaluate(&[reading("k10temp_Tctl_temp1", 92.0)], t0(), &notifier);

        assert_eq!(report.raised.len(), 1);
        assert_eq!(report.raised[0].threshold, 85.0);
        assert_eq!(report.raised[0].severity, Severity::Normal);
        assert!(report.raised[0].delivered);
        assert_eq!(engine.state().last_alert("k10temp_Tctl_temp1"), Some(t0()));

        let sent = notifier.delivered();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].severity, Severity::Normal);
    }

    #[test]
    fn test_large_overshoot_is_critical() {
        let mut engine = engine();
        let notifier = RecordingNotifier::new();

        let report = engine.evaluate(&[reading("nvidia_gpu_0", 95.5)], t0(), &notifier);
        assert_eq!(report.raised[0].severity, Severity::Critical);
    }

    #[test]
    fn test_equal_to_threshold_is_not_breach() {
        let mut engine = engine();
        let notifier = RecordingNotifier::new();

        let report = engine.evaluate(&[reading("nvidia_gpu_0", 83.0)], t0(), &notifier);
        assert!(report.raised.is_empty());
        assert!(engine.state().is_empty());
    }

    #[test]
    fn test_cooldown_suppresses_then_refires() {
        let mut engine = engine();
        let notifier = RecordingNotifier::new();
        let hot = [reading("k10temp_Tctl_temp1", 92.0)];

        engine.evaluate(&hot, t0(), &notifier);
        assert_eq!(notifier.delivered().len(), 1);

        let report = engine.evaluate(&hot, t0() + TimeDelta::seconds(100), &notifier);
        assert_eq!(notifier.delivered().len(), 1);
        assert_eq!(report.suppressed, vec![SensorId::new("k10temp_Tctl_temp1")]);
        assert_eq!(engine.state().last_alert("k10temp_Tctl_temp1"), Some(t0()));

        let later = t0() + TimeDelta::seconds(301);
        let report = engine.evaluate(&hot, later, &notifier);
        assert_eq!(notifier.delivered().len(), 2);
        assert_eq!(report.raised.len(), 1);
        assert_eq!(engine.state().last_alert("k10temp_Tctl_temp1"), Some(later));
    }

    #[test]
    fn test_cooldown_boundary_is_inclusive() {
        let mut engine = engine();
        let notifier = RecordingNotifier::new();
        let hot = [reading("amd_gpu", 95.0)];

        engine.evaluate(&hot, t0(), &notifier);
        engine.evaluate(&hot, t0() + TimeDelta::seconds(300), &notifier);
        assert_eq!(notifier.delivered().len(), 2);
    }

    #[test]
    fn test_recovery_clears_state() {
        let mut engine = engine();
        let notifier = RecordingNotifier::new();

        engine.evaluate(&[reading("thermal_thermal_zone0", 72.0)], t0(), &notifier);
        assert!(engine.state().is_alerting("thermal_thermal_zone0"));

        let report = engine.evaluate(
            &[reading("thermal_thermal_zone0", 45.0)],
            t0() + TimeDelta::seconds(60),
            &notifier,
        );
        assert_eq!(report.normalized, vec![SensorId::new("thermal_thermal_zone0")]);
        assert!(!engine.state().is_alerting("thermal_thermal_zone0"));
    }

    #[test]
    fn test_recovery_absent_after_reload() {
        let dir = TempDir::new().unwrap();
        let store = AlertStateStore::new(dir.path().join("alerts.json"));
        let notifier = RecordingNotifier::new();

        let mut engine = engine();
        engine.evaluate(&[reading("nvme-pci-0100_Composite_temp1", 80.0)], t0(), &notifier);
        engine.persist(&store).unwrap();

        let mut engine = AlertEngine::load(
            ThresholdPolicy::default(),
            FriendlyNames::new(),
            DEFAULT_COOLDOWN,
            &store,
        );
        assert!(engine.state().is_alerting("nvme-pci-0100_Composite_temp1"));

        engine.evaluate(&[reading("nvme-pci-0100_Composite_temp1", 60.0)], t0(), &notifier);
        engine.persist(&store).unwrap();

        assert!(!store.try_load().unwrap().is_alerting("nvme-pci-0100_Composite_temp1"));
    }

    #[test]
    fn test_reloaded_state_keeps_cooldown() {
        let dir = TempDir::new().unwrap();
        let store = AlertStateStore::new(dir.path().join("alerts.json"));
        let notifier = RecordingNotifier::new();
        let hot = [reading("nvidia_gpu_0", 90.0)];

        let mut engine = engine();
        engine.evaluate(&hot, t0(), &notifier);
        engine.persist(&store).unwrap();

        let mut restarted = AlertEngine::load(
            ThresholdPolicy::default(),
            FriendlyNames::new(),
            DEFAULT_COOLDOWN,
            &store,
        );
        restarted.evaluate(&hot, t0() + TimeDelta::seconds(60), &notifier);
        assert_eq!(notifier.delivered().len(), 1);
    }

    #[test]
    fn test_delivery_failure_still_records() {
        let mut engine = engine();
        let notifier = RecordingNotifier::failing();

        let report = engine.evaluate(&[reading("amd_gpu", 99.0)], t0(), &notifier);
        assert_eq!(report.failed_deliveries(), 1);
        assert!(engine.state().is_alerting("amd_gpu"));
    }

    #[test]
    fn test_unseen_sensors_keep_their_entry() {
        let mut state = AlertState::new();
        state.record(SensorId::new("nvidia_gpu_1"), t0());
        let mut engine = AlertEngine::new(
            ThresholdPolicy::default(),
            FriendlyNames::new(),
            DEFAULT_COOLDOWN,
            state,
        );

        engine.evaluate(&[reading("amd_gpu", 40.0)], t0(), &RecordingNotifier::new());
        assert!(engine.state().is_alerting("nvidia_gpu_1"));
    }

    #[test]
    fn test_future_timestamp_suppresses() {
        let mut state = AlertState::new();
        state.record(SensorId::new("amd_gpu"), t0() + TimeDelta::hours(1));
        let mut engine = AlertEngine::new(
            ThresholdPolicy::default(),
            FriendlyNames::new(),
            DEFAULT_COOLDOWN,
            state,
        );

        let report = engine.evaluate(&[reading("amd_gpu", 99.0)], t0(), &RecordingNotifier::new());
        assert_eq!(report.suppressed.len(), 1);
    }

    #[test]
    fn test_non_finite_reading_ignored() {
        let mut engine = engine();
        let report = engine.evaluate(&[reading("amd_gpu", f64::NAN)], t0(), &RecordingNotifier::new());
        assert_eq!(report, CycleReport::default());
        assert!(engine.state().is_empty());
    }
}
