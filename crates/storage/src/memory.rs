use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{ItemSnapshot, KeyValueStore, Revision, StoreError, StoreResult};

/// Process-local store with the same revision semantics as the SQLite one.
#[derive(Default)]
pub struct MemoryStore {
    items: Mutex<HashMap<String, ItemSnapshot>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a raw value, bypassing revision checks. Used to load fixtures.
    pub async fn insert_raw(&self, key: &str, value: impl Into<String>) {
        let mut guard = self.items.lock().await;
        let entry = guard.entry(key.to_string()).or_default();
        entry.value = Some(value.into());
        entry.revision = entry.revision.next();
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get_item(&self, key: &str) -> StoreResult<ItemSnapshot> {
        Ok(self.items.lock().await.get(key).cloned().unwrap_or_default())
    }

    async fn set_item(&self, key: &str, value: &str, expected: Revision) -> StoreResult<Revision> {
        let mut guard = self.items.lock().await;
        let entry = guard.entry(key.to_string()).or_default();
        if entry.revision != expected {
            return Err(StoreError::Conflict {
                key: key.to_string(),
                expected: expected.0,
                actual: entry.revision.0,
            });
        }
        entry.value = Some(value.to_string());
        entry.revision = expected.next();
        Ok(entry.revision)
    }

    async fn remove_item(&self, key: &str) -> StoreResult<()> {
        if let Some(entry) = self.items.lock().await.get_mut(key) {
            entry.value = None;
            entry.revision = entry.revision.next();
        }
        Ok(())
    }
}
