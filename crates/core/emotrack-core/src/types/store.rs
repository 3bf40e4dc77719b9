//! Store contracts shared by the ingestion and summary engines

use super::PersonEmotionState;
use crate::Result;
use async_trait::async_trait;

/// A unit of work against an [`EmotionStore`].
///
/// Writes become visible to other readers only after [`commit`](Self::commit).
/// Dropping a transaction without committing discards its writes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StoreTransaction: Send {
    /// Read a record, including writes staged earlier in this transaction
    async fn get(&mut self, device_id: &str, person_id: &str)
        -> Result<Option<PersonEmotionState>>;

    /// Stage an overwrite of the record keyed by `(state.device_id, state.person_id)`
    async fn put(&mut self, state: &PersonEmotionState) -> Result<()>;

    /// Durably commit every staged write
    async fn commit(&mut self) -> Result<()>;
}

/// Persistent per-person state addressed by `(device_id, person_id)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmotionStore: Send + Sync {
    /// Fetch one record
    async fn get(&self, device_id: &str, person_id: &str) -> Result<Option<PersonEmotionState>>;

    /// Overwrite one record (idempotent), committed immediately
    async fn put(&self, state: &PersonEmotionState) -> Result<()>;

    /// Every record for a device, in storage (insertion) order
    async fn list_by_device(&self, device_id: &str) -> Result<Vec<PersonEmotionState>>;

    /// Open a transaction
    async fn begin(&self) -> Result<Box<dyn StoreTransaction>>;

    /// Check if the store can serve requests
    async fn is_ready(&self) -> Result<bool> {
        Ok(true)
    }
}
