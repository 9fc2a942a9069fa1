//! Registration list persisted under a single key as one JSON array.

use std::sync::Arc;

use shared::domain::{RecordId, RegistrationRecord, REGISTRATIONS_KEY};
use tracing::{debug, warn};

use crate::{KeyValueStore, Revision, StoreError, StoreResult};

const MAX_WRITE_ATTEMPTS: usize = 3;

#[derive(Debug, Clone, Default)]
pub struct LoadedRecords {
    pub records: Vec<RegistrationRecord>,
    pub revision: Revision,
}

#[derive(Clone)]
pub struct RegistrationRepository {
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl RegistrationRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_key(store, REGISTRATIONS_KEY)
    }

    pub fn with_key(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub async fn load(&self) -> StoreResult<LoadedRecords> {
        let snapshot = self.store.get_item(&self.key).await?;
        Ok(LoadedRecords {
            records: decode_records(&self.key, snapshot.value.as_deref()),
            revision: snapshot.revision,
        })
    }

    pub async fn records(&self) -> StoreResult<Vec<RegistrationRecord>> {
        Ok(self.load().await?.records)
    }

    pub async fn count(&self) -> StoreResult<usize> {
        Ok(self.load().await?.records.len())
    }

    /// Largest id currently stored.
    pub async fn latest_id(&self) -> StoreResult<Option<RecordId>> {
        Ok(self.load().await?.records.iter().map(|r| r.id).max())
    }

    /// Appends `record` and rewrites the whole list, returning the new list.
    ///
    /// A concurrent writer that advanced the revision in between causes the
    /// read-modify-write to restart from a fresh read.
    pub async fn append(&self, record: RegistrationRecord) -> StoreResult<Vec<RegistrationRecord>> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let LoadedRecords {
                mut records,
                revision,
            } = self.load().await?;
            records.push(record.clone());

            let encoded = serde_json::to_string(&records).map_err(|source| StoreError::Encode {
                key: self.key.clone(),
                source,
            })?;

            match self.store.set_item(&self.key, &encoded, revision).await {
                Ok(new_revision) => {
                    debug!(
                        key = %self.key,
                        revision = new_revision.0,
                        records = records.len(),
                        "registrations: list written"
                    );
                    return Ok(records);
                }
                Err(StoreError::Conflict {
                    expected, actual, ..
                }) if attempt < MAX_WRITE_ATTEMPTS => {
                    warn!(
                        key = %self.key,
                        attempt,
                        expected,
                        actual,
                        "registrations: concurrent write detected, retrying"
                    );
                }
                Err(err) => return Err(err),
            }
        }
    }

    pub async fn clear(&self) -> StoreResult<()> {
        self.store.remove_item(&self.key).await
    }
}

fn decode_records(key: &str, raw: Option<&str>) -> Vec<RegistrationRecord> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    match serde_json::from_str::<Vec<RegistrationRecord>>(raw) {
        Ok(records) => records,
        Err(err) => {
            warn!(key, error = %err, "registrations: stored list unreadable, treating as empty");
            Vec::new()
        }
    }
}
