//! GPU temperature adapter
//!
//! Two independent probes:
//! - discrete NVIDIA GPUs through NVML, falling back to `nvidia-smi`
//! - an integrated AMD GPU found in the plain-text `sensors` output
//!
//! Either, both or neither may produce readings.

use super::command::CommandRunner;
use super::TemperatureSource;
use crate::domain::Reading;
use crate::error::SourceError;

use chrono::Utc;
use nvml_wrapper::enum_wrappers::device::TemperatureSensor;
use nvml_wrapper::Nvml;
use regex::Regex;
use std::sync::LazyLock;

const SOURCE_NAME: &str = "gpu";

const NVIDIA_SMI_ARGS: &[&str] = &[
    "--query-gpu=temperature.gpu",
    "--format=csv,noheader,nounits",
];

/// Source of discrete GPU temperatures, as `(device index, celsius)`
pub trait GpuProbe: Send + Sync {
    /// Probe name for logging
    fn name(&self) -> &str;

    /// Query every device
    fn temperatures(&self) -> Result<Vec<(u32, f64)>, SourceError>;
}

/// NVML-backed probe
///
/// NVML is initialized per query; the collector runs once per cycle so
/// there is nothing to gain from keeping the library loaded.
#[derive(Debug, Default, Clone, Copy)]
pub struct NvmlProbe;

impl GpuProbe for NvmlProbe {
    fn name(&self) -> &str {
        "nvml"
    }

    fn temperatures(&self) -> Result<Vec<(u32, f64)>, SourceError> {
        let nvml = Nvml::init().map_err(|e| match e {
            nvml_wrapper::error::NvmlError::LibloadingError(_) => {
                SourceError::unavailable("nvml", "NVML library not found")
            }
            nvml_wrapper::error::NvmlError::DriverNotLoaded => {
                SourceError::unavailable("nvml", "NVIDIA driver not loaded")
            }
            other => SourceError::unavailable("nvml", other),
        })?;

        let count = nvml
            .device_count()
            .map_err(|e| SourceError::unavailable("nvml", e))?;

        let mut temperatures = Vec::with_capacity(count as usize);
        for index in 0..count {
            match nvml
                .device_by_index(index)
                .and_then(|device| device.temperature(TemperatureSensor::Gpu))
            {
                Ok(celsius) => temperatures.push((index, celsius as f64)),
                Err(e) => log::warn!("nvml: GPU {} temperature unavailable: {}", index, e),
            }
        }

        Ok(temperatures)
    }
}

/// GPU adapter
pub struct GpuSource<R: CommandRunner> {
    runner: R,
    nvml: Option<Box<dyn GpuProbe>>,
    sensors_command: String,
    nvidia_smi_command: String,
}

impl<R: CommandRunner> GpuSource<R> {
    /// Create an adapter using NVML first, then the given commands
    pub fn new(
        runner: R,
        sensors_command: impl Into<String>,
        nvidia_smi_command: impl Into<String>,
    ) -> Self {
        Self {
            runner,
            nvml: Some(Box::new(NvmlProbe)),
            sensors_command: sensors_command.into(),
            nvidia_smi_command: nvidia_smi_command.into(),
        }
    }

    /// Replace the NVML probe; `None` goes straight to nvidia-smi
    pub fn with_nvml_probe(mut self, probe: Option<Box<dyn GpuProbe>>) -> Self {
        self.nvml = probe;
        self
    }

    fn discrete_temperatures(&self) -> Vec<(u32, f64)> {
        if let Some(probe) = &self.nvml {
            match probe.temperatures() {
                Ok(temperatures) => return temperatures,
                Err(e) => log::debug!("{}: {}; falling back to nvidia-smi", probe.name(), e),
            }
        }

        self.runner
            .run(&self.nvidia_smi_command, NVIDIA_SMI_ARGS)
            .map(|output| parse_nvidia_smi(&output))
            .unwrap_or_else(|e| {
                log_probe_failure(&e);
                Vec::new()
            })
    }

    fn integrated_temperature(&self) -> Option<f64> {
        self.runner
            .run(&self.sensors_command, &[])
            .map(|output| parse_amdgpu_text(&output))
            .unwrap_or_else(|e| {
                log_probe_failure(&e);
                None
            })
    }
}

impl<R: CommandRunner> TemperatureSource for GpuSource<R> {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    fn collect(&self) -> Vec<Reading> {
        let observed_at = Utc::now();

        let mut readings: Vec<Reading> = self
            .discrete_temperatures()
            .into_iter()
            .map(|(index, celsius)| {
                Reading::celsius(format!("nvidia_gpu_{}", index), celsius, observed_at)
            })
            .collect();

        if let Some(celsius) = self.integrated_temperature() {
            readings.push(Reading::celsius("amd_gpu", celsius, observed_at));
        }

        readings
    }
}

/// A missing GPU tool is the normal case on most machines
fn log_probe_failure(err: &SourceError) {
    match err {
        SourceError::Unavailable { .. } => log::debug!("{}: {}", SOURCE_NAME, err),
        _ => log::warn!("{}: {}", SOURCE_NAME, err),
    }
}

/// Parse `nvidia-smi --format=csv,noheader,nounits` output
///
/// The device index is the line position; lines that do not parse (e.g.
/// `[N/A]`) are skipped without shifting later indices.
pub fn parse_nvidia_smi(output: &str) -> Vec<(u32, f64)> {
    output
        .trim()
        .lines()
        .enumerate()
        .filter_map(|(index, line)| {
            line.trim()
                .parse::<f64>()
                .ok()
                .map(|celsius| (index as u32, celsius))
        })
        .collect()
}

static DEGREE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([+-]?\d+\.?\d*)\s*°C").expect("valid regex"));

/// First temperature of the amdgpu chip in plain `sensors` output
///
/// A line qualifies when it mentions `amdgpu` itself or belongs to a chip
/// block whose header starts with `amdgpu`; blocks end at a blank line.
pub fn parse_amdgpu_text(output: &str) -> Option<f64> {
    let mut in_amdgpu_block = false;

    for line in output.lines() {
        if line.trim().is_empty() {
            in_amdgpu_block = false;
            continue;
        }

        let lower = line.to_lowercase();
        if lower.starts_with("amdgpu") {
            in_amdgpu_block = true;
        }

        if (in_amdgpu_block || lower.contains("amdgpu")) && line.contains("°C") {
            let celsius = DEGREE_RE
                .captures(line)
                .and_then(|caps| caps.get(1))
                .and_then(|m| m.as_str().parse::<f64>().ok());
            if celsius.is_some() {
                return celsius;
            }
        }
    }

    None
}
