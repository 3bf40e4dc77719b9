//! Dashboard aggregation over stored per-person state

use crate::types::{
    DashboardSummary, DeviceDirectory, EmotionStore, EmotionTimes, PersonEmotionState,
    PersonSummary, Timestamp, UNKNOWN_DEVICE_NAME,
};
use crate::Result;
use chrono::Utc;
use std::sync::Arc;
use tracing::debug;

/// Sum each emotion across `records`; the key set is the union of all keys.
///
/// Sums saturate at `f64::MAX` so a total always serializes as a number.
pub fn emotion_totals(records: &[PersonEmotionState]) -> EmotionTimes {
    let mut totals = EmotionTimes::new();
    for record in records {
        for (emotion, seconds) in &record.emotion_times {
            let total = totals.entry(emotion.clone()).or_insert(0.0);
            *total = (*total + seconds).min(f64::MAX);
        }
    }
    totals
}

/// Build a summary from already-fetched records
pub fn summarize(
    device_id: &str,
    device_name: String,
    updated_at: Timestamp,
    records: &[PersonEmotionState],
) -> DashboardSummary {
    DashboardSummary {
        device_id: device_id.to_string(),
        device_name,
        updated_at,
        emotion_totals: emotion_totals(records),
        current_people: records.iter().map(PersonSummary::from).collect(),
    }
}

/// Read-only engine computing per-device dashboard summaries
#[derive(Clone)]
pub struct SummaryEngine {
    store: Arc<dyn EmotionStore>,
    directory: Arc<dyn DeviceDirectory>,
}

impl SummaryEngine {
    /// Create an engine reading from `store` and naming devices via `directory`
    pub fn new(store: Arc<dyn EmotionStore>, directory: Arc<dyn DeviceDirectory>) -> Self {
        Self { store, directory }
    }

    /// Summarize every person recorded for `device_id`.
    ///
    /// A device without records yields empty totals and no people.
    pub async fn get_summary(&self, device_id: &str) -> Result<DashboardSummary> {
        let records = self.store.list_by_device(device_id).await?;
        let device_name = self
            .directory
            .device_name(device_id)
            .unwrap_or_else(|| UNKNOWN_DEVICE_NAME.to_string());

        debug!(device_id, people = records.len(), "Building dashboard summary");
        Ok(summarize(device_id, device_name, Utc::now(), &records))
    }
}
