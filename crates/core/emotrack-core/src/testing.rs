//! Test fixtures shared by the workspace's test suites

use crate::types::*;
use chrono::{TimeZone, Utc};

/// Fixed base instant for fixtures (2025-11-14T12:34:56Z)
pub const BASE_EPOCH_SECS: i64 = 1_763_123_696;

/// Timestamp `secs` seconds after [`BASE_EPOCH_SECS`]
pub fn ts(secs: i64) -> Timestamp {
    Utc.timestamp_opt(BASE_EPOCH_SECS + secs, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

/// Build an emotion map from `(label, seconds)` pairs
pub fn times(pairs: &[(&str, f64)]) -> EmotionTimes {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

/// Create a person report
pub fn report(person_id: &str, pairs: &[(&str, f64)]) -> PersonReport {
    PersonReport::new(person_id, times(pairs))
}

/// Create a stored state
pub fn state(
    device_id: &str,
    person_id: &str,
    pairs: &[(&str, f64)],
    last_seen: Timestamp,
) -> PersonEmotionState {
    PersonEmotionState::new(device_id, person_id, times(pairs), last_seen)
}

/// Create a batch
pub fn sample_batch(device_id: &str, timestamp: Timestamp, people: Vec<PersonReport>) -> IngestBatch {
    IngestBatch::new(device_id, timestamp, people)
}
