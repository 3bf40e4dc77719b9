//! Batch upsert of cumulative emotion reports

use crate::types::{EmotionStore, IngestBatch, IngestResult, PersonEmotionState};
use crate::{EmotrackError, Result};
use std::sync::Arc;
use tracing::{debug, warn};

/// Applies device batches to the store, one transaction per batch
#[derive(Clone)]
pub struct IngestEngine {
    store: Arc<dyn EmotionStore>,
}

impl IngestEngine {
    /// Create an engine writing to `store`
    pub fn new(store: Arc<dyn EmotionStore>) -> Self {
        Self { store }
    }

    /// Validate and apply a batch atomically.
    ///
    /// Every report is checked before anything is written; a single invalid
    /// report rejects the whole batch with [`EmotrackError::InvalidBatch`].
    /// Valid batches are upserted inside one store transaction, so readers
    /// see either none or all of the batch.
    pub async fn ingest_batch(&self, batch: &IngestBatch) -> Result<IngestResult> {
        if batch.device_id.is_empty() {
            return Err(EmotrackError::validation("device_id must not be empty"));
        }

        let rejections = batch.rejections();
        if !rejections.is_empty() {
            warn!(
                device_id = %batch.device_id,
                rejected = rejections.len(),
                total = batch.people.len(),
                "Rejecting emotion batch"
            );
            return Err(EmotrackError::invalid_batch(&batch.device_id, rejections));
        }

        if batch.people.is_empty() {
            debug!(device_id = %batch.device_id, "Empty emotion batch, nothing to apply");
            return Ok(IngestResult { updated_count: 0 });
        }

        let mut tx = self.store.begin().await?;
        let mut created = 0usize;

        for report in &batch.people {
            let next = match tx.get(&batch.device_id, &report.person_id).await? {
                Some(mut existing) => {
                    if batch.timestamp < existing.last_seen {
                        warn!(
                            device_id = %batch.device_id,
                            person_id = %report.person_id,
                            stored = %existing.last_seen,
                            incoming = %batch.timestamp,
                            "Applying backdated report over newer state"
                        );
                    }
                    existing.apply_report(&report.cumulative, batch.timestamp);
                    existing
                }
                None => {
                    created += 1;
                    PersonEmotionState::new(
                        batch.device_id.clone(),
                        report.person_id.clone(),
                        report.cumulative.clone(),
                        batch.timestamp,
                    )
                }
            };
            tx.put(&next).await?;
        }

        tx.commit().await?;

        let updated_count = batch.people.len();
        debug!(
            device_id = %batch.device_id,
            updated_count,
            created,
            "Committed emotion batch"
        );
        Ok(IngestResult { updated_count })
    }
}
