//! Reading merge and deduplication

use crate::domain::{Reading, SensorId};

use std::collections::HashSet;

/// Merge adapter outputs into one batch with unique sensor ids
///
/// `batches` must be in adapter precedence order. The first reading seen
/// for an id is kept and later ones are dropped; output keeps first-seen order.
pub fn merge(batches: Vec<Vec<Reading>>) -> Vec<Reading> {
    let mut seen: HashSet<SensorId> = HashSet::new();
    let mut merged = Vec::new();

    for reading in batches.into_iter().flatten() {
        if seen.contains(reading.id()) {
            log::debug!("Dropping duplicate reading for {}", reading.sensor_id);
            continue;
        }
        seen.insert(reading.sensor_id.clone());
        merged.push(reading);
    }

    merged
}
