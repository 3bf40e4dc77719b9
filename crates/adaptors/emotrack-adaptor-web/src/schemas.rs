//! Wire schemas exchanged with devices and the dashboard

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use emotrack_core::{PersonReport, Timestamp};
use serde::{Deserialize, Serialize};

/// Batch update posted by a device
///
/// ```json
/// {
///   "device_id": "jetson_1",
///   "timestamp": "2025-11-14T12:34:56Z",
///   "people": [
///     { "person_id": "1", "cumulative": { "happy": 120.5, "sad": 10.0, "angry": 0.0 } }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmotionsBatchIn {
    /// Reporting device
    pub device_id: String,
    /// ISO 8601 timestamp as sent by the device
    pub timestamp: String,
    /// Per-person cumulative seconds
    pub people: Vec<PersonReport>,
}

/// Response after a batch was committed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionsBatchResponse {
    /// Always `"ok"`
    pub status: String,
    /// Reports applied
    pub updated_count: usize,
}

/// Health check response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    /// `"ok"` when the store answers, `"degraded"` otherwise
    pub status: String,
}

/// Query string of the dashboard summary endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SummaryQuery {
    /// Device to summarize; the configured default when absent
    pub device_id: Option<String>,
}

/// Rejected report as reported to the device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectionOut {
    /// Position in `people`
    pub index: usize,
    /// Person id as sent
    pub person_id: String,
    /// Human-readable reason
    pub reason: String,
}

/// Error body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Whether resending the same request may succeed
    pub retryable: bool,
    /// Rejected reports, for invalid batches
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rejections: Vec<RejectionOut>,
}

/// Parse an ISO 8601 device timestamp.
///
/// Accepts RFC 3339 (`Z` or an offset) and naive date-times, which are taken
/// as UTC. Either `T` or a space may separate date and time, seconds may be
/// omitted, and a bare date means midnight UTC.
pub fn parse_timestamp(raw: &str) -> Option<Timestamp> {
    const NAIVE_FORMATS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];

    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc())
}
