//! Friendly sensor names
//!
//! Turns canonical sensor ids into display labels: an exact-match table
//! first, then pattern-based fallbacks, then a title-cased version of the id.

use std::collections::HashMap;

/// Labels for the ids seen on the reference machine
const BUILTIN_LABELS: &[(&str, &str)] = &[
    ("k10temp-pci-00c3_Tctl_temp1", "CPU Control Temperature"),
    ("k10temp-pci-00c3_Tccd1_temp3", "CPU Core Temperature"),
    ("amd_gpu", "AMD GPU"),
    ("nvme-pci-0100_Composite_temp1", "NVMe SSD-1"),
    ("nvme-pci-0100_Sensor 1_temp2", "NVMe SSD-1 Sensor 1"),
    ("nvme-pci-0100_Sensor 2_temp3", "NVMe SSD-1 Sensor 2"),
    ("nvme-pci-0400_Composite_temp1", "NVMe SSD-2"),
    ("nvme-pci-0400_Sensor 1_temp2", "NVMe SSD-2 Sensor 1"),
    ("nvme-pci-0400_Sensor 2_temp3", "NVMe SSD-2 Sensor 2"),
    ("iwlwifi_1-virtual-0_temp1_temp1", "WiFi Adapter"),
    ("r8169_0_2a00:00-mdio-0_temp1_temp1", "Ethernet Adapter"),
    ("thermal_thermal_zone0", "System Thermal Zone"),
];

/// Sensor id to display label lookup
#[derive(Debug, Clone)]
pub struct FriendlyNames {
    exact: HashMap<String, String>,
}

impl FriendlyNames {
    /// Create a lookup with the built-in label table
    pub fn new() -> Self {
        let exact = BUILTIN_LABELS
            .iter()
            .map(|(id, label)| (id.to_string(), label.to_string()))
            .collect();
        Self { exact }
    }

    /// Add or replace exact labels
    pub fn with_overrides<I, K, V>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (id, label) in overrides {
            self.exact.insert(id.into(), label.into());
        }
        self
    }

    /// Get the display label for a sensor id
    pub fn lookup(&self, sensor_id: &str) -> String {
        if let Some(label) = self.exact.get(sensor_id) {
            return label.clone();
        }

        pattern_label(sensor_id).unwrap_or_else(|| title_case(&sensor_id.replace('_', " ")))
    }
}

impl Default for FriendlyNames {
    fn default() -> Self {
        Self::new()
    }
}

fn pattern_label(sensor_id: &str) -> Option<String> {
    let lower = sensor_id.to_lowercase();

    if lower.contains("nvidia_gpu") {
        let label = match trailing_number(sensor_id) {
            Some(index) => format!("NVIDIA GPU {}", index + 1),
            None => "NVIDIA GPU".to_string(),
        };
        return Some(label);
    }

    if lower.contains("amd_gpu") {
        return Some("AMD GPU".to_string());
    }

    if lower.contains("k10temp") {
        let label = if lower.contains("tctl") {
            "CPU Control Temperature"
        } else if lower.contains("tccd") {
            "CPU Core Temperature"
        } else {
            "CPU Temperature"
        };
        return Some(label.to_string());
    }

    if lower.contains("nvme") {
        // Device number comes from the PCI address of the two known drives.
        let device = if sensor_id.contains("0100") {
            Some(1)
        } else if sensor_id.contains("0400") {
            Some(2)
        } else {
            None
        };

        if lower.contains("composite") {
            return Some(match device {
                Some(n) => format!("NVMe SSD-{}", n),
                None => "NVMe SSD".to_string(),
            });
        }

        if lower.contains("sensor") {
            let sensor = if sensor_id.contains("temp2") {
                "1"
            } else if sensor_id.contains("temp3") {
                "2"
            } else {
                ""
            };
            return Some(match device {
                Some(n) => format!("NVMe SSD-{} Sensor {}", n, sensor).trim_end().to_string(),
                None => "NVMe Sensor".to_string(),
            });
        }

        return None;
    }

    if lower.contains("iwlwifi") || lower.contains("wifi") {
        return Some("WiFi Adapter".to_string());
    }

    if lower.contains("r8169") || lower.contains("ethernet") {
        return Some("Ethernet Adapter".to_string());
    }

    if lower.contains("thermal_zone") {
        return Some(match trailing_number(sensor_id) {
            Some(0) | None => "System Thermal Zone".to_string(),
            Some(n) => format!("System Thermal Zone {}", n),
        });
    }

    None
}

fn trailing_number(s: &str) -> Option<u32> {
    let digits: String = s
        .chars()
        .rev()
        .take_while(|c| c.is_ascii_digit())
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    digits.parse().ok()
}

/// Capitalize the first letter of every alphabetic run, lowercase the rest
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        let names = FriendlyNames::new();
        assert_eq!(
            names.lookup("k10temp-pci-00c3_Tctl_temp1"),
            "CPU Control Temperature"
        );
        assert_eq!(names.lookup("thermal_thermal_zone0"), "System Thermal Zone");
    }

    #[test]
    fn test_pattern_fallbacks() {
        let names = FriendlyNames::new();
        assert_eq!(names.lookup("nvidia_gpu_0"), "NVIDIA GPU 1");
        assert_eq!(names.lookup("nvidia_gpu_1"), "NVIDIA GPU 2");
        assert_eq!(names.lookup("k10temp-pci-00cb_Tccd2_temp4"), "CPU Core Temperature");
        assert_eq!(names.lookup("k10temp-pci-00cb_Tdie_temp2"), "CPU Temperature");
        assert_eq!(names.lookup("thermal_thermal_zone3"), "System Thermal Zone 3");
        assert_eq!(names.lookup("iwlwifi_2-virtual-0_temp1_temp1"), "WiFi Adapter");
    }

    #[test]
    fn test_nvme_numbering() {
        let names = FriendlyNames::new();
        assert_eq!(names.lookup("nvme-pci-0400_Composite_temp9"), "NVMe SSD-2");
        assert_eq!(names.lookup("nvme-pci-0100_Sensor 8_temp3"), "NVMe SSD-1 Sensor 2");
        assert_eq!(names.lookup("nvme-pci-0900_Composite_temp1"), "NVMe SSD");
        assert_eq!(names.lookup("nvme-pci-0900_Sensor 1_temp2"), "NVMe Sensor");
    }

    #[test]
    fn test_title_case_fallback() {
        let names = FriendlyNames::new();
        assert_eq!(names.lookup("acpitz-acpi-0_temp1_temp1"), "Acpitz-Acpi-0 Temp1 Temp1");
    }

    #[test]
    fn test_overrides_take_precedence() {
        let names = FriendlyNames::new().with_overrides([("nvidia_gpu_0", "Main GPU")]);
        assert_eq!(names.lookup("nvidia_gpu_0"), "Main GPU");
        assert_eq!(names.lookup("nvidia_gpu_1"), "NVIDIA GPU 2");
    }
}
