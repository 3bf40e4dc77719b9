//! Per-person emotion state

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Timestamp type used throughout the core
pub type Timestamp = DateTime<Utc>;

/// Cumulative seconds per emotion label
pub type EmotionTimes = BTreeMap<String, f64>;

/// Label reported as the current emotion of a person with no recorded times
pub const NEUTRAL_EMOTION: &str = "neutral";

/// Latest cumulative emotion durations for one person seen by one device.
///
/// Addressed by the composite key `(device_id, person_id)`; `person_id` is
/// only unique within its device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonEmotionState {
    /// Reporting device
    pub device_id: String,

    /// Device-scoped person identifier
    pub person_id: String,

    /// Cumulative seconds per emotion label
    pub emotion_times: EmotionTimes,

    /// Timestamp of the batch that last touched this record
    pub last_seen: Timestamp,
}

impl PersonEmotionState {
    /// Create the first state for a `(device_id, person_id)` pair
    pub fn new(
        device_id: impl Into<String>,
        person_id: impl Into<String>,
        emotion_times: EmotionTimes,
        last_seen: Timestamp,
    ) -> Self {
        Self {
            device_id: device_id.into(),
            person_id: person_id.into(),
            emotion_times,
            last_seen,
        }
    }

    /// Merge a cumulative report into this state.
    ///
    /// Keys present in `cumulative` overwrite the stored value (devices send
    /// running totals, not deltas). Keys absent from `cumulative` keep their
    /// previous value. `last_seen` always moves to `timestamp`, even backwards.
    pub fn apply_report(&mut self, cumulative: &EmotionTimes, timestamp: Timestamp) {
        for (emotion, seconds) in cumulative {
            self.emotion_times.insert(emotion.clone(), *seconds);
        }
        self.last_seen = timestamp;
    }

    /// The emotion with the largest cumulative time.
    ///
    /// Ties go to the lexicographically smallest label. A person with no
    /// recorded emotions, or whose times are all zero, is `"neutral"`.
    pub fn current_emotion(&self) -> &str {
        let mut best: Option<(&str, f64)> = None;
        // BTreeMap iterates in ascending key order, so a strict `>` keeps the
        // smallest label among equal maxima.
        for (emotion, seconds) in &self.emotion_times {
            match best {
                Some((_, max)) if *seconds <= max => {}
                _ => best = Some((emotion.as_str(), *seconds)),
            }
        }
        match best {
            Some((emotion, max)) if max > 0.0 => emotion,
            _ => NEUTRAL_EMOTION,
        }
    }
}
