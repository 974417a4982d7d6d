//! Mock implementations for testing
//!
//! Scripted commands, GPU probes, notifiers, sources and sinks so adapters
//! and the collection cycle can be tested without real hardware.

use crate::alerts::{Notification, Notifier};
use crate::domain::Reading;
use crate::error::{DeliveryError, SourceError, StorageError};
use crate::sources::{CommandRunner, GpuProbe, TemperatureSource};
use crate::storage::ReadingSink;

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

fn command_line(program: &str, args: &[&str]) -> String {
    std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Command runner with scripted output
///
/// Unknown commands fail as if the program were not installed.
#[derive(Debug, Default)]
pub struct MockRunner {
    outputs: HashMap<String, String>,
    accepted: HashSet<String>,
    calls: Mutex<Vec<String>>,
}

impl MockRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: return `output` for exactly this command line
    pub fn with_output(mut self, program: &str, args: &[&str], output: &str) -> Self {
        self.outputs
            .insert(command_line(program, args), output.to_string());
        self
    }

    /// Builder: succeed with empty output for any invocation of `program`
    pub fn accept_any(mut self, program: &str) -> Self {
        self.accepted.insert(program.to_string());
        self
    }

    /// Every command line run or spawned so far
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn respond(&self, program: &str, args: &[&str]) -> Result<String, SourceError> {
        let line = command_line(program, args);
        self.calls.lock().unwrap().push(line.clone());

        if let Some(output) = self.outputs.get(&line) {
            return Ok(output.clone());
        }
        if self.accepted.contains(program) {
            return Ok(String::new());
        }
        Err(SourceError::unavailable(program, "command not found"))
    }
}

impl CommandRunner for MockRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<String, SourceError> {
        self.respond(program, args)
    }

    fn spawn(&self, program: &str, args: &[&str]) -> Result<(), SourceError> {
        self.respond(program, args).map(|_| ())
    }
}

/// GPU probe with fixed results
pub struct MockGpuProbe {
    result: Option<Vec<(u32, f64)>>,
}

impl MockGpuProbe {
    /// Probe reporting `temperatures`
    pub fn ok(temperatures: Vec<(u32, f64)>) -> Self {
        Self {
            result: Some(temperatures),
        }
    }

    /// Probe whose library is missing
    pub fn unavailable() -> Self {
        Self { result: None }
    }
}

impl GpuProbe for MockGpuProbe {
    fn name(&self) -> &str {
        "mock-nvml"
    }

    fn temperatures(&self) -> Result<Vec<(u32, f64)>, SourceError> {
        self.result
            .clone()
            .ok_or_else(|| SourceError::unavailable("mock-nvml", "library not found"))
    }
}

#[derive(Debug, Default)]
struct NotifierLog {
    attempts: usize,
    delivered: Vec<Notification>,
}

/// Notifier that records what it was asked to deliver
///
/// Clones share one log, so a test can keep a handle after boxing a clone.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    fail: bool,
    log: Arc<Mutex<NotifierLog>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifier that rejects every notification
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Number of notify calls, successful or not
    pub fn attempts(&self) -> usize {
        self.log.lock().unwrap().attempts
    }

    /// Notifications accepted so far
    pub fn delivered(&self) -> Vec<Notification> {
        self.log.lock().unwrap().delivered.clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: &Notification) -> Result<(), DeliveryError> {
        let mut log = self.log.lock().unwrap();
        log.attempts += 1;
        if self.fail {
            return Err(DeliveryError::Failed {
                channel: "recording".to_string(),
                reason: "rejected".to_string(),
            });
        }
        log.delivered.push(notification.clone());
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }
}

/// Source returning a fixed batch
pub struct MockSource {
    name: String,
    readings: Vec<Reading>,
}

impl MockSource {
    pub fn new(name: impl Into<String>, readings: Vec<Reading>) -> Self {
        Self {
            name: name.into(),
            readings,
        }
    }

    /// Source that produced nothing, as after a swallowed failure
    pub fn empty(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new())
    }
}

impl TemperatureSource for MockSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn collect(&self) -> Vec<Reading> {
        self.readings.clone()
    }
}

/// Sink keeping batches in memory
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    batches: Arc<Mutex<Vec<Vec<Reading>>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Batches appended so far
    pub fn batches(&self) -> Vec<Vec<Reading>> {
        self.batches.lock().unwrap().clone()
    }
}

impl ReadingSink for MemorySink {
    fn append(&self, readings: &[Reading]) -> Result<(), StorageError> {
        self.batches.lock().unwrap().push(readings.to_vec());
        Ok(())
    }
}

/// Sink whose disk is always unavailable
#[derive(Debug, Default)]
pub struct FailingSink;

impl ReadingSink for FailingSink {
    fn append(&self, _readings: &[Reading]) -> Result<(), StorageError> {
        Err(StorageError::Write {
            path: "/unavailable/readings.jsonl".into(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_runner_scripted_output() {
        let runner = MockRunner::new().with_output("sensors", &["-A", "-j"], "{}");
        assert_eq!(runner.run("sensors", &["-A", "-j"]).unwrap(), "{}");
        assert!(runner.run("sensors", &[]).is_err());
        assert_eq!(runner.calls(), vec!["sensors -A -j", "sensors"]);
    }

    #[test]
    fn test_recording_notifier_shares_log() {
        let notifier = RecordingNotifier::new();
        let handle = notifier.clone();
        let n = Notification::breach(&"amd_gpu".into(), "AMD GPU", 95.0, 90.0);
        notifier.notify(&n).unwrap();
        assert_eq!(handle.attempts(), 1);
        assert_eq!(handle.delivered(), vec![n]);
    }
}
