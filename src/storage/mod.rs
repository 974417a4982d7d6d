//! Reading storage
//!
//! Each collection cycle hands its merged batch to a [`ReadingSink`]. The
//! built-in sink appends JSON lines, one reading per line:
//!
//! ```text
//! {"sensor_id":"nvidia_gpu_0","temperature":48.0,"unit":"C","observed_at":"2026-10-16T09:12:44.102Z"}
//! ```

use crate::domain::Reading;
use crate::error::StorageError;

use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Destination for collected readings
pub trait ReadingSink {
    /// Persist one batch
    fn append(&self, readings: &[Reading]) -> Result<(), StorageError>;
}

/// Append-only JSON lines file
#[derive(Debug, Clone)]
pub struct JsonLinesSink {
    path: PathBuf,
}

impl JsonLinesSink {
    /// Create a sink writing to `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Output file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_err(&self, source: std::io::Error) -> StorageError {
        StorageError::Write {
            path: self.path.clone(),
            source,
        }
    }
}

impl ReadingSink for JsonLinesSink {
    fn append(&self, readings: &[Reading]) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.write_err(e))?;
        }

        let mut lines = String::new();
        for reading in readings {
            lines.push_str(&serde_json::to_string(reading)?);
            lines.push('\n');
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.write_err(e))?;

        let mut writer = BufWriter::new(file);
        writer
            .write_all(lines.as_bytes())
            .and_then(|_| writer.flush())
            .map_err(|e| self.write_err(e))?;

        log::debug!(
            "Stored {} readings in {}",
            readings.len(),
            self.path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use tempfile::TempDir;

    fn at() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-10-16T09:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_appends_one_line_per_reading() {
        let dir = TempDir::new().unwrap();
        let sink = JsonLinesSink::new(dir.path().join("data").join("readings.jsonl"));

        sink.append(&[
            Reading::celsius("nvidia_gpu_0", 48.0, at()),
            Reading::celsius("amd_gpu", 52.5, at()),
        ])
        .unwrap();
        sink.append(&[Reading::celsius("nvidia_gpu_0", 49.0, at())])
            .unwrap();

        let content = fs::read_to_string(sink.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["sensor_id"], "nvidia_gpu_0");
        assert_eq!(first["temperature"], 48.0);
        assert_eq!(first["unit"], "C");
    }

    #[test]
    fn test_unwritable_path_is_error() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "").unwrap();

        let sink = JsonLinesSink::new(blocker.join("readings.jsonl"));
        let result = sink.append(&[Reading::celsius("amd_gpu", 50.0, at())]);
        assert!(matches!(result, Err(StorageError::Write { .. })));
    }
}
