//! In-process [`EmotionStore`] backed by a lock-protected map
//!
//! Used by tests and by deployments that do not need durability. A
//! transaction holds the write lock until it is committed or dropped, so
//! readers never see a half-applied batch.

use crate::types::{EmotionStore, PersonEmotionState, StoreTransaction};
use crate::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{OwnedRwLockWriteGuard, RwLock};

#[derive(Debug, Default)]
struct Records {
    // Per-device rows in insertion order.
    devices: HashMap<String, Vec<PersonEmotionState>>,
}

impl Records {
    fn get(&self, device_id: &str, person_id: &str) -> Option<&PersonEmotionState> {
        self.devices
            .get(device_id)?
            .iter()
            .find(|s| s.person_id == person_id)
    }

    fn put(&mut self, state: PersonEmotionState) {
        let people = self.devices.entry(state.device_id.clone()).or_default();
        match people.iter_mut().find(|s| s.person_id == state.person_id) {
            Some(slot) => *slot = state,
            None => people.push(state),
        }
    }
}

/// In-memory emotion store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Arc<RwLock<Records>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of records across all devices
    pub async fn len(&self) -> usize {
        self.records
            .read()
            .await
            .devices
            .values()
            .map(Vec::len)
            .sum()
    }

    /// Whether the store holds no records
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl EmotionStore for MemoryStore {
    async fn get(&self, device_id: &str, person_id: &str) -> Result<Option<PersonEmotionState>> {
        Ok(self.records.read().await.get(device_id, person_id).cloned())
    }

    async fn put(&self, state: &PersonEmotionState) -> Result<()> {
        self.records.write().await.put(state.clone());
        Ok(())
    }

    async fn list_by_device(&self, device_id: &str) -> Result<Vec<PersonEmotionState>> {
        Ok(self
            .records
            .read()
            .await
            .devices
            .get(device_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn begin(&self) -> Result<Box<dyn StoreTransaction>> {
        let guard = self.records.clone().write_owned().await;
        Ok(Box::new(MemoryTransaction {
            guard,
            staged: Vec::new(),
        }))
    }
}

/// Transaction over a [`MemoryStore`]; staged writes are discarded on drop
pub struct MemoryTransaction {
    guard: OwnedRwLockWriteGuard<Records>,
    staged: Vec<PersonEmotionState>,
}

#[async_trait]
impl StoreTransaction for MemoryTransaction {
    async fn get(
        &mut self,
        device_id: &str,
        person_id: &str,
    ) -> Result<Option<PersonEmotionState>> {
        let staged = self
            .staged
            .iter()
            .find(|s| s.device_id == device_id && s.person_id == person_id);
        Ok(staged
            .or_else(|| self.guard.get(device_id, person_id))
            .cloned())
    }

    async fn put(&mut self, state: &PersonEmotionState) -> Result<()> {
        match self
            .staged
            .iter_mut()
            .find(|s| s.device_id == state.device_id && s.person_id == state.person_id)
        {
            Some(slot) => *slot = state.clone(),
            None => self.staged.push(state.clone()),
        }
        Ok(())
    }

    async fn commit(&mut self) -> Result<()> {
        for state in self.staged.drain(..) {
            self.guard.put(state);
        }
        Ok(())
    }
}
