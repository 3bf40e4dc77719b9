//! Ingestion request and result types

use super::{EmotionTimes, Timestamp};
use crate::error::{Rejection, RejectionReason};
use serde::{Deserialize, Serialize};

/// Cumulative emotion totals for one person, as sent by a device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonReport {
    /// Device-scoped person identifier
    pub person_id: String,

    /// Cumulative seconds per emotion label
    pub cumulative: EmotionTimes,
}

impl PersonReport {
    /// Create a report
    pub fn new(person_id: impl Into<String>, cumulative: EmotionTimes) -> Self {
        Self {
            person_id: person_id.into(),
            cumulative,
        }
    }

    /// Check this report, returning the first problem found
    pub fn check(&self) -> Option<RejectionReason> {
        if self.person_id.is_empty() {
            return Some(RejectionReason::EmptyPersonId);
        }
        for (emotion, seconds) in &self.cumulative {
            if emotion.is_empty() {
                return Some(RejectionReason::EmptyEmotionLabel);
            }
            if !seconds.is_finite() {
                return Some(RejectionReason::NonFiniteValue {
                    emotion: emotion.clone(),
                });
            }
            if *seconds < 0.0 {
                return Some(RejectionReason::NegativeValue {
                    emotion: emotion.clone(),
                    value: *seconds,
                });
            }
        }
        None
    }
}

/// One ingestion call: a device, the batch timestamp and per-person reports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestBatch {
    /// Reporting device
    pub device_id: String,

    /// Batch timestamp, applied as `last_seen` to every touched record
    pub timestamp: Timestamp,

    /// Per-person cumulative reports
    pub people: Vec<PersonReport>,
}

impl IngestBatch {
    /// Create a batch
    pub fn new(device_id: impl Into<String>, timestamp: Timestamp, people: Vec<PersonReport>) -> Self {
        Self {
            device_id: device_id.into(),
            timestamp,
            people,
        }
    }

    /// Collect every invalid report in the batch
    pub fn rejections(&self) -> Vec<Rejection> {
        self.people
            .iter()
            .enumerate()
            .filter_map(|(index, report)| {
                report.check().map(|reason| Rejection {
                    index,
                    person_id: report.person_id.clone(),
                    reason,
                })
            })
            .collect()
    }
}

/// Outcome of a committed batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestResult {
    /// Person reports applied (creates and updates combined)
    pub updated_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn report(person_id: &str, pairs: &[(&str, f64)]) -> PersonReport {
        PersonReport::new(
            person_id,
            pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        )
    }

    #[test]
    fn test_valid_report_passes() {
        assert_eq!(report("1", &[("happy", 120.5), ("sad", 0.0)]).check(), None);
        assert_eq!(report("1", &[]).check(), None);
    }

    #[test]
    fn test_report_checks() {
        assert_eq!(
            report("", &[("happy", 1.0)]).check(),
            Some(RejectionReason::EmptyPersonId)
        );
        assert_eq!(
            report("1", &[("", 1.0)]).check(),
            Some(RejectionReason::EmptyEmotionLabel)
        );
        assert_eq!(
            report("1", &[("sad", -0.5)]).check(),
            Some(RejectionReason::NegativeValue {
                emotion: "sad".to_string(),
                value: -0.5
            })
        );
        assert_eq!(
            report("1", &[("angry", f64::NAN)]).check(),
            Some(RejectionReason::NonFiniteValue {
                emotion: "angry".to_string()
            })
        );
        assert_eq!(
            report("1", &[("angry", f64::INFINITY)]).check(),
            Some(RejectionReason::NonFiniteValue {
                emotion: "angry".to_string()
            })
        );
    }

    #[test]
    fn test_batch_rejections_keep_positions() {
        let batch = IngestBatch::new(
            "jetson_1",
            Utc::now(),
            vec![
                report("1", &[("happy", 1.0)]),
                report("", &[("happy", 1.0)]),
                report("3", &[("sad", -2.0)]),
            ],
        );

        let rejections = batch.rejections();
        assert_eq!(rejections.len(), 2);
        assert_eq!(rejections[0].index, 1);
        assert_eq!(rejections[1].index, 2);
        assert_eq!(rejections[1].person_id, "3");
    }
}
