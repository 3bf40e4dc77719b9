//! Error types for Emotrack core

use std::fmt;
use thiserror::Error;

/// Why a single person report was rejected
#[derive(Debug, Clone, PartialEq)]
pub enum RejectionReason {
    /// The report carried an empty `person_id`
    EmptyPersonId,
    /// An emotion label in `cumulative` was empty
    EmptyEmotionLabel,
    /// A cumulative value was below zero
    NegativeValue {
        /// Emotion label
        emotion: String,
        /// Reported value
        value: f64,
    },
    /// A cumulative value was NaN or infinite
    NonFiniteValue {
        /// Emotion label
        emotion: String,
    },
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectionReason::EmptyPersonId => write!(f, "empty person_id"),
            RejectionReason::EmptyEmotionLabel => write!(f, "empty emotion label"),
            RejectionReason::NegativeValue { emotion, value } => {
                write!(f, "negative value {} for '{}'", value, emotion)
            }
            RejectionReason::NonFiniteValue { emotion } => {
                write!(f, "non-finite value for '{}'", emotion)
            }
        }
    }
}

/// One rejected person report inside a batch
#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    /// Position of the report in the batch
    pub index: usize,
    /// Person id as reported (may be empty)
    pub person_id: String,
    /// What was wrong with it
    pub reason: RejectionReason,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "people[{}] (person_id '{}'): {}",
            self.index, self.person_id, self.reason
        )
    }
}

fn join_rejections(rejections: &[Rejection]) -> String {
    rejections
        .iter()
        .map(|r| r.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Main error type for Emotrack operations
#[derive(Debug, Error)]
pub enum EmotrackError {
    /// Store operation error (from sqlx)
    #[error("Store unavailable: {0}")]
    Store(#[from] sqlx::Error),

    /// Store operation error (custom message)
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// One or more person reports failed validation; nothing was committed
    #[error(
        "Invalid batch from device '{device_id}': {} report(s) rejected: {}",
        .rejections.len(),
        join_rejections(.rejections)
    )]
    InvalidBatch {
        /// Device that sent the batch
        device_id: String,
        /// Every rejected report
        rejections: Vec<Rejection>,
    },

    /// Batch-level validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Convenient Result type using EmotrackError
pub type Result<T> = std::result::Result<T, EmotrackError>;

impl EmotrackError {
    /// Create a store error
    pub fn store(msg: impl Into<String>) -> Self {
        EmotrackError::StoreUnavailable(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        EmotrackError::Validation(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        EmotrackError::Config(msg.into())
    }

    /// Create an invalid batch error
    pub fn invalid_batch(device_id: impl Into<String>, rejections: Vec<Rejection>) -> Self {
        EmotrackError::InvalidBatch {
            device_id: device_id.into(),
            rejections,
        }
    }

    /// Whether the caller may retry the same request unchanged
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            EmotrackError::Store(_) | EmotrackError::StoreUnavailable(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = EmotrackError::validation("device_id must not be empty");
        assert_eq!(
            err.to_string(),
            "Validation error: device_id must not be empty"
        );

        let err = EmotrackError::store("disk full");
        assert_eq!(err.to_string(), "Store unavailable: disk full");
    }

    #[test]
    fn test_invalid_batch_lists_every_rejection() {
        let err = EmotrackError::invalid_batch(
            "jetson_1",
            vec![
                Rejection {
                    index: 0,
                    person_id: String::new(),
                    reason: RejectionReason::EmptyPersonId,
                },
                Rejection {
                    index: 2,
                    person_id: "7".to_string(),
                    reason: RejectionReason::NegativeValue {
                        emotion: "sad".to_string(),
                        value: -1.5,
                    },
                },
            ],
        );

        let msg = err.to_string();
        assert!(msg.starts_with("Invalid batch from device 'jetson_1': 2 report(s) rejected"));
        assert!(msg.contains("people[0] (person_id ''): empty person_id"));
        assert!(msg.contains("people[2] (person_id '7'): negative value -1.5 for 'sad'"));
    }

    #[test]
    fn test_retryable_kinds() {
        assert!(EmotrackError::store("locked").is_retryable());
        assert!(EmotrackError::Store(sqlx::Error::PoolTimedOut).is_retryable());
        assert!(!EmotrackError::validation("bad").is_retryable());
        assert!(!EmotrackError::invalid_batch("d", vec![]).is_retryable());
    }
}
