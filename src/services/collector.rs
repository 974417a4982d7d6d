//! Ordered collection across source adapters

use super::normalize::merge;
use crate::domain::Reading;
use crate::sources::TemperatureSource;

/// Runs adapters sequentially, in precedence order
pub struct Collector {
    sources: Vec<Box<dyn TemperatureSource>>,
}

impl Collector {
    /// Create a collector; earlier sources win on duplicate ids
    pub fn new(sources: Vec<Box<dyn TemperatureSource>>) -> Self {
        Self { sources }
    }

    /// Names of the configured sources, in order
    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Collect from every source and merge into one deduplicated batch
    pub fn collect(&self) -> Vec<Reading> {
        let batches = self
            .sources
            .iter()
            .map(|source| {
                let readings = source.collect();
                log::debug!("{}: {} readings", source.name(), readings.len());
                readings
            })
            .collect();

        merge(batches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockSource;
    use chrono::Utc;

    #[test]
    fn test_collect_in_source_order() {
        let now = Utc::now();
        let collector = Collector::new(vec![
            Box::new(MockSource::new(
                "lm-sensors",
                vec![Reading::celsius("k10temp_Tctl_temp1", 60.0, now)],
            )),
            Box::new(MockSource::empty("thermal-zones")),
            Box::new(MockSource::new(
                "gpu",
                vec![Reading::celsius("nvidia_gpu_0", 48.0, now)],
            )),
        ]);

        assert_eq!(
            collector.source_names(),
            vec!["lm-sensors", "thermal-zones", "gpu"]
        );
        let ids: Vec<String> = collector
            .collect()
            .iter()
            .map(|r| r.id().to_string())
            .collect();
        assert_eq!(ids, vec!["k10temp_Tctl_temp1", "nvidia_gpu_0"]);
    }

    #[test]
    fn test_no_sources() {
        assert!(Collector::new(Vec::new()).collect().is_empty());
    }
}
