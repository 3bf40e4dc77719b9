//! Dashboard summary types

use super::{EmotionTimes, PersonEmotionState, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Key prefix for per-emotion times in a [`PersonSummary`]
pub const TIME_KEY_PREFIX: &str = "time_";

/// One person's row on the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonSummary {
    /// Device-scoped person identifier
    pub person_id: String,

    /// Emotion with the largest cumulative time
    pub current_emotion: String,

    /// `time_<emotion>` -> cumulative seconds, one entry per recorded emotion
    #[serde(flatten)]
    pub times: BTreeMap<String, f64>,

    /// Timestamp of the batch that last touched the record
    pub last_seen: Timestamp,
}

impl PersonSummary {
    /// Cumulative seconds for `emotion`, if the person has a value for it
    pub fn time(&self, emotion: &str) -> Option<f64> {
        self.times
            .get(&format!("{}{}", TIME_KEY_PREFIX, emotion))
            .copied()
    }
}

impl From<&PersonEmotionState> for PersonSummary {
    fn from(state: &PersonEmotionState) -> Self {
        Self {
            person_id: state.person_id.clone(),
            current_emotion: state.current_emotion().to_string(),
            times: state
                .emotion_times
                .iter()
                .map(|(emotion, seconds)| (format!("{}{}", TIME_KEY_PREFIX, emotion), *seconds))
                .collect(),
            last_seen: state.last_seen,
        }
    }
}

/// Aggregated view of one device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    /// Device the summary describes
    pub device_id: String,

    /// Display name, `"Unknown"` when the directory has none
    pub device_name: String,

    /// When the summary was computed
    pub updated_at: Timestamp,

    /// Per-emotion sum over every person of the device
    pub emotion_totals: EmotionTimes,

    /// One row per person, in storage order
    pub current_people: Vec<PersonSummary>,
}
