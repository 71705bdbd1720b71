//! In-process metadata store for file records.

use std::collections::HashSet;
use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::sync::RwLock;

use boxlite_core::error::AppError;
use boxlite_core::result::AppResult;
use boxlite_core::types::id::{FileId, StorageRef};
use boxlite_entity::file::FileRecord;

/// One record behind its own lock. `None` once the record was deleted,
/// so a reader that raced a delete observes the removal.
pub(crate) type RecordSlot = Arc<RwLock<Option<FileRecord>>>;

/// Maps file ids to records; the single source of truth for ownership,
/// size, and content location.
///
/// Records on distinct ids never contend: the map only guards slot
/// lookup, and each slot carries its own read/write lock.
#[derive(Debug, Default)]
pub struct MetadataStore {
    records: DashMap<FileId, RecordSlot>,
}

impl MetadataStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Commit a new record. Fails if the id is already taken.
    pub fn insert(&self, record: FileRecord) -> AppResult<()> {
        match self.records.entry(record.file_id.clone()) {
            Entry::Occupied(_) => Err(AppError::internal(format!(
                "Duplicate file id: {}",
                record.file_id
            ))),
            Entry::Vacant(slot) => {
                slot.insert(Arc::new(RwLock::new(Some(record))));
                Ok(())
            }
        }
    }

    /// A copy of the record, if present.
    pub async fn get(&self, file_id: &FileId) -> Option<FileRecord> {
        let slot = self.slot(file_id)?;
        let guard = slot.read().await;
        guard.clone()
    }

    /// Copies of every record matching `filter`, in no particular order.
    pub async fn find<F>(&self, filter: F) -> Vec<FileRecord>
    where
        F: Fn(&FileRecord) -> bool,
    {
        let mut matches = Vec::new();
        for slot in self.slots() {
            let guard = slot.read().await;
            if let Some(record) = guard.as_ref().filter(|r| filter(*r)) {
                matches.push(record.clone());
            }
        }
        matches
    }

    /// Storage references of every live record.
    pub async fn storage_references(&self) -> HashSet<StorageRef> {
        let mut references = HashSet::new();
        for slot in self.slots() {
            if let Some(record) = slot.read().await.as_ref() {
                references.insert(record.storage_reference.clone());
            }
        }
        references
    }

    /// Number of live records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Shared handle to a record's slot.
    pub(crate) fn slot(&self, file_id: &FileId) -> Option<RecordSlot> {
        self.records.get(file_id).map(|entry| Arc::clone(entry.value()))
    }

    /// Drop the map entry, but only if it still points at `slot`.
    pub(crate) fn remove_slot(&self, file_id: &FileId, slot: &RecordSlot) {
        self.records
            .remove_if(file_id, |_, current| Arc::ptr_eq(current, slot));
    }

    /// Snapshot of all slots so no map guard is held across an await.
    fn slots(&self) -> Vec<RecordSlot> {
        self.records
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect()
    }
}
