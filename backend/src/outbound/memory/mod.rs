//! In-process document store adapter.
//!
//! Collections are insertion-ordered vectors behind a single `RwLock`, so
//! every operation runs as one critical section. That gives
//! [`DocumentStore::adjust_counter`] the store-level atomicity the port
//! demands: concurrent adjustments serialize on the lock and no increment is
//! lost. The lock is never held across an await point.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use mockable::{Clock, DefaultClock};
use serde_json::{json, Value};

use crate::domain::document::{DeleteReport, Document, DocumentId, Filter, UpdateReport};
use crate::domain::ports::{DocumentStore, DocumentStoreError};
use crate::domain::ID_FIELD;

type Collections = HashMap<String, Vec<Document>>;

/// Thread-safe in-memory [`DocumentStore`].
///
/// Suitable for single-node deployments and tests; the storage engine behind
/// the port is explicitly out of scope for the rest of the system.
pub struct MemoryStore {
    collections: RwLock<Collections>,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl MemoryStore {
    /// Create an empty store using the system clock for identifier stamps.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(DefaultClock))
    }

    /// Create an empty store with an injected clock.
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            clock,
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Collections> {
        self.collections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Collections> {
        self.collections
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn position_of(records: &[Document], id: &DocumentId) -> Option<usize> {
    records
        .iter()
        .position(|record| record.get_str(ID_FIELD) == Some(id.as_str()))
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn list(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Vec<Document>, DocumentStoreError> {
        let guard = self.read();
        let records = guard.get(collection).map(Vec::as_slice).unwrap_or_default();
        // Newest first: vectors grow in insertion order.
        Ok(records
            .iter()
            .rev()
            .filter(|record| filter.matches(record))
            .cloned()
            .collect())
    }

    async fn get(
        &self,
        collection: &str,
        id: &DocumentId,
    ) -> Result<Option<Document>, DocumentStoreError> {
        let guard = self.read();
        let records = guard.get(collection).map(Vec::as_slice).unwrap_or_default();
        Ok(position_of(records, id).and_then(|idx| records.get(idx)).cloned())
    }

    async fn insert(
        &self,
        collection: &str,
        document: Document,
    ) -> Result<Document, DocumentStoreError> {
        let id = DocumentId::generate(self.clock.utc());
        let mut stored = document;
        stored.set(ID_FIELD, json!(id.as_str()));
        let mut guard = self.write();
        guard
            .entry(collection.to_owned())
            .or_default()
            .push(stored.clone());
        Ok(stored)
    }

    async fn update(
        &self,
        collection: &str,
        id: &DocumentId,
        fields: Document,
    ) -> Result<UpdateReport, DocumentStoreError> {
        let mut guard = self.write();
        let records = guard.entry(collection.to_owned()).or_default();
        match position_of(records, id) {
            Some(idx) => {
                let record = records
                    .get_mut(idx)
                    .ok_or_else(|| DocumentStoreError::backend("record vanished mid-update"))?;
                let mut modified = 0;
                for (field, value) in fields.into_fields() {
                    if record.get(&field) != Some(&value) {
                        modified = 1;
                    }
                    record.set(field, value);
                }
                Ok(UpdateReport {
                    matched_count: 1,
                    modified_count: modified,
                    upserted_id: None,
                })
            }
            None => {
                // Upsert: the new record holds exactly the supplied fields.
                let mut created = fields;
                created.set(ID_FIELD, json!(id.as_str()));
                records.push(created);
                Ok(UpdateReport {
                    matched_count: 0,
                    modified_count: 0,
                    upserted_id: Some(id.clone()),
                })
            }
        }
    }

    async fn delete(
        &self,
        collection: &str,
        id: &DocumentId,
    ) -> Result<DeleteReport, DocumentStoreError> {
        let mut guard = self.write();
        let records = guard.entry(collection.to_owned()).or_default();
        let before = records.len();
        records.retain(|record| record.get_str(ID_FIELD) != Some(id.as_str()));
        let removed = before - records.len();
        Ok(DeleteReport {
            deleted_count: u64::try_from(removed).unwrap_or_default(),
        })
    }

    async fn adjust_counter(
        &self,
        collection: &str,
        id: &DocumentId,
        field: &str,
        delta: i64,
    ) -> Result<UpdateReport, DocumentStoreError> {
        let mut guard = self.write();
        let records = guard.entry(collection.to_owned()).or_default();
        match position_of(records, id) {
            Some(idx) => {
                let record = records
                    .get_mut(idx)
                    .ok_or_else(|| DocumentStoreError::backend("record vanished mid-adjust"))?;
                // Absent counters start at zero; no clamping on the way down.
                let current = record.get_i64(field).unwrap_or(0);
                record.set(field, Value::from(current + delta));
                Ok(UpdateReport {
                    matched_count: 1,
                    modified_count: u64::from(delta != 0),
                    upserted_id: None,
                })
            }
            None => {
                let mut created = Document::new();
                created.set(ID_FIELD, json!(id.as_str()));
                created.set(field, Value::from(delta));
                records.push(created);
                Ok(UpdateReport {
                    matched_count: 0,
                    modified_count: 0,
                    upserted_id: Some(id.clone()),
                })
            }
        }
    }
}
