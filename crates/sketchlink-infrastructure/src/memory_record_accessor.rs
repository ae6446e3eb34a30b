//! In-memory record accessor.
//!
//! Used by tests and demos, and by hosts that keep records elsewhere and only
//! need a scratch store for one editing session.

use async_trait::async_trait;
use sketchlink_core::error::{BridgeError, Result};
use sketchlink_core::export::ExportResult;
use sketchlink_core::record::{DiagramRecord, RecordAccessor, RecordId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

/// Stored state of one in-memory record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredRecord {
    pub record: DiagramRecord,
    pub image: Option<String>,
}

/// A record accessor backed by a `HashMap`.
#[derive(Debug, Default)]
pub struct InMemoryRecordAccessor {
    records: RwLock<HashMap<RecordId, StoredRecord>>,
    writes: AtomicUsize,
}

impl InMemoryRecordAccessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a record.
    pub async fn insert(&self, record_id: impl Into<RecordId>, record: DiagramRecord) {
        self.records.write().await.insert(
            record_id.into(),
            StoredRecord {
                record,
                image: None,
            },
        );
    }

    /// Returns a copy of a stored record.
    pub async fn get(&self, record_id: &RecordId) -> Option<StoredRecord> {
        self.records.read().await.get(record_id).cloned()
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecordAccessor for InMemoryRecordAccessor {
    async fn read(&self, record_id: &RecordId) -> Result<DiagramRecord> {
        self.records
            .read()
            .await
            .get(record_id)
            .map(|stored| stored.record.clone())
            .ok_or_else(|| BridgeError::not_found("record", record_id.as_str()))
    }

    async fn write(&self, record_id: &RecordId, export: &ExportResult) -> Result<()> {
        let mut records = self.records.write().await;
        let stored = records
            .get_mut(record_id)
            .ok_or_else(|| BridgeError::not_found("record", record_id.as_str()))?;

        stored.record.document = Some(export.document.clone());
        stored.image = export.image.clone();
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
