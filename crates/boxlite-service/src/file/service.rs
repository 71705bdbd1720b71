//! File store operations: upload, fetch, list, mutate, delete.

use std::collections::HashSet;
use std::sync::Arc;

use bytes::Bytes;
use dashmap::DashSet;
use tracing::{debug, error, info, warn};

use boxlite_core::config::storage::StorageConfig;
use boxlite_core::error::{AppError, ErrorKind};
use boxlite_core::result::AppResult;
use boxlite_core::traits::clock::Clock;
use boxlite_core::traits::storage::{ByteStream, ContentStore};
use boxlite_core::types::id::{FileId, FolderId, StorageRef, UserId};
use boxlite_entity::file::FileRecord;

use super::metadata::{MetadataStore, RecordSlot};

/// Handles file records and their content.
///
/// Content is always written before metadata is committed, so a record
/// never points at bytes that were not durably stored first.
#[derive(Debug, Clone)]
pub struct FileService {
    /// File records.
    metadata: Arc<MetadataStore>,
    /// Raw bytes.
    content: Arc<dyn ContentStore>,
    /// Time source for record timestamps.
    clock: Arc<dyn Clock>,
    /// Upload limits.
    config: StorageConfig,
    /// References written but not yet committed to metadata.
    pending: Arc<DashSet<StorageRef>>,
}

/// Marks a storage reference as in flight until dropped.
struct PendingUpload<'a> {
    pending: &'a DashSet<StorageRef>,
    reference: StorageRef,
}

impl<'a> PendingUpload<'a> {
    fn begin(pending: &'a DashSet<StorageRef>, reference: StorageRef) -> Self {
        pending.insert(reference.clone());
        Self { pending, reference }
    }
}

impl Drop for PendingUpload<'_> {
    fn drop(&mut self) {
        self.pending.remove(&self.reference);
    }
}

impl FileService {
    /// Creates a new file service.
    pub fn new(
        metadata: Arc<MetadataStore>,
        content: Arc<dyn ContentStore>,
        clock: Arc<dyn Clock>,
        config: StorageConfig,
    ) -> Self {
        Self {
            metadata,
            content,
            clock,
            config,
            pending: Arc::new(DashSet::new()),
        }
    }

    /// The metadata store backing this service.
    pub fn metadata(&self) -> &Arc<MetadataStore> {
        &self.metadata
    }

    /// Stores new content and records its metadata with `version = 1`.
    pub async fn store(
        &self,
        owner_id: &UserId,
        data: Bytes,
        original_name: &str,
        folder_id: Option<FolderId>,
    ) -> AppResult<FileRecord> {
        if owner_id.is_blank() {
            return Err(AppError::invalid_argument("Owner ID must be provided"));
        }
        if original_name.trim().is_empty() {
            return Err(AppError::invalid_argument("File name cannot be empty"));
        }
        if !self.config.extension_allowed(original_name) {
            return Err(AppError::invalid_argument(format!(
                "File type not allowed: {original_name}"
            )));
        }
        self.check_size(&data)?;

        let file_id = FileId::generate();
        let reference = StorageRef::generate();
        let size_bytes = data.len() as u64;

        let _pending = PendingUpload::begin(&self.pending, reference.clone());
        self.content.write(&reference, data).await?;

        let now = self.clock.now();
        let record = FileRecord {
            file_id,
            owner_id: owner_id.clone(),
            folder_id,
            original_name: original_name.to_string(),
            size_bytes,
            storage_reference: reference,
            created_at: now,
            updated_at: now,
            version: 1,
        };

        if let Err(e) = self.metadata.insert(record.clone()) {
            self.discard_content(&record.storage_reference).await;
            return Err(e);
        }

        info!(
            file_id = %record.file_id,
            owner_id = %record.owner_id,
            size_bytes,
            "File stored"
        );

        Ok(record)
    }

    /// Returns a file's record and complete content.
    ///
    /// Performs no authorization; callers compare `owner_id` themselves.
    pub async fn fetch(&self, file_id: &FileId) -> AppResult<(FileRecord, Bytes)> {
        let slot = self.slot(file_id)?;
        let guard = slot.read().await;
        let record = guard.as_ref().ok_or_else(|| not_found(file_id))?;

        let data = self
            .content
            .read_bytes(&record.storage_reference)
            .await
            .map_err(|e| self.missing_content(record, e))?;

        Ok((record.clone(), data))
    }

    /// Returns a file's record and a stream over its content.
    pub async fn open(&self, file_id: &FileId) -> AppResult<(FileRecord, ByteStream)> {
        let slot = self.slot(file_id)?;
        let guard = slot.read().await;
        let record = guard.as_ref().ok_or_else(|| not_found(file_id))?;

        let stream = self
            .content
            .read(&record.storage_reference)
            .await
            .map_err(|e| self.missing_content(record, e))?;

        Ok((record.clone(), stream))
    }

    /// Lists an owner's files in one folder (`None` is the root),
    /// most recently updated first.
    pub async fn list(
        &self,
        owner_id: &UserId,
        folder_id: Option<&FolderId>,
    ) -> AppResult<Vec<FileRecord>> {
        if owner_id.is_blank() {
            return Err(AppError::invalid_argument("User ID must be provided"));
        }

        let mut files = self
            .metadata
            .find(|r| &r.owner_id == owner_id && r.folder_id.as_ref() == folder_id)
            .await;
        sort_recent_first(&mut files);

        debug!(owner_id = %owner_id, count = files.len(), "Listed files");
        Ok(files)
    }

    /// Deletes a file owned by `requester_id` and releases its content.
    pub async fn delete(&self, file_id: &FileId, requester_id: &UserId) -> AppResult<()> {
        let slot = self.slot(file_id)?;
        let mut guard = slot.write().await;
        let record = guard.as_ref().ok_or_else(|| not_found(file_id))?;
        if !record.is_owned_by(requester_id) {
            return Err(AppError::forbidden("You can only delete your own files"));
        }

        let Some(record) = guard.take() else {
            return Err(not_found(file_id));
        };
        self.metadata.remove_slot(file_id, &slot);

        // Orphaned content is reclaimed later by `reclaim_orphans`.
        if let Err(e) = self.content.delete(&record.storage_reference).await {
            warn!(
                file_id = %file_id,
                error = %e,
                "Failed to release content; left for reclamation"
            );
        }
        drop(guard);

        info!(file_id = %file_id, owner_id = %requester_id, "File deleted");
        Ok(())
    }

    /// Replaces a file's content, bumping its version. Owner only.
    pub async fn replace_content(
        &self,
        file_id: &FileId,
        requester_id: &UserId,
        data: Bytes,
    ) -> AppResult<FileRecord> {
        self.overwrite(file_id, data, |record| {
            if record.is_owned_by(requester_id) {
                Ok(())
            } else {
                Err(AppError::forbidden("You can only modify your own files"))
            }
        })
        .await
    }

    /// Moves a file to another folder (`None` is the root). Owner only.
    pub async fn move_file(
        &self,
        file_id: &FileId,
        requester_id: &UserId,
        folder_id: Option<FolderId>,
    ) -> AppResult<FileRecord> {
        let slot = self.slot(file_id)?;
        let mut guard = slot.write().await;
        let record = guard.as_mut().ok_or_else(|| not_found(file_id))?;
        if !record.is_owned_by(requester_id) {
            return Err(AppError::forbidden("You can only move your own files"));
        }

        record.folder_id = folder_id;
        record.updated_at = self.clock.now();

        info!(file_id = %file_id, folder_id = ?record.folder_id, "File moved");
        Ok(record.clone())
    }

    /// Deletes stored content that no record references. Returns the
    /// number of objects removed.
    pub async fn reclaim_orphans(&self) -> AppResult<usize> {
        // Order matters: anything listed here was pending before its
        // metadata commit, so it is either still pending below or
        // already visible in the reference snapshot.
        let stored = self.content.list_references().await?;
        let pending: HashSet<StorageRef> = self.pending.iter().map(|r| r.key().clone()).collect();
        let referenced = self.metadata.storage_references().await;

        let mut removed = 0;
        for reference in stored {
            if referenced.contains(&reference) || pending.contains(&reference) {
                continue;
            }
            self.content.delete(&reference).await?;
            removed += 1;
        }

        if removed > 0 {
            info!(removed, "Reclaimed orphaned content");
        }
        Ok(removed)
    }

    /// Writes new content under the record's existing reference after
    /// `authorize` accepts the record, then bumps version and timestamps.
    pub(crate) async fn overwrite<F>(
        &self,
        file_id: &FileId,
        data: Bytes,
        authorize: F,
    ) -> AppResult<FileRecord>
    where
        F: FnOnce(&FileRecord) -> AppResult<()>,
    {
        self.check_size(&data)?;

        let slot = self.slot(file_id)?;
        let mut guard = slot.write().await;
        let record = guard.as_mut().ok_or_else(|| not_found(file_id))?;
        authorize(&*record)?;

        let size_bytes = data.len() as u64;
        self.content.write(&record.storage_reference, data).await?;

        record.size_bytes = size_bytes;
        record.version += 1;
        record.updated_at = self.clock.now();

        info!(
            file_id = %file_id,
            version = record.version,
            size_bytes,
            "File content replaced"
        );
        Ok(record.clone())
    }

    fn slot(&self, file_id: &FileId) -> AppResult<RecordSlot> {
        self.metadata.slot(file_id).ok_or_else(|| not_found(file_id))
    }

    fn check_size(&self, data: &Bytes) -> AppResult<()> {
        if data.len() as u64 > self.config.max_upload_size_bytes {
            return Err(AppError::invalid_argument(format!(
                "File exceeds maximum upload size of {} bytes",
                self.config.max_upload_size_bytes
            )));
        }
        Ok(())
    }

    /// Maps a content read failure. Missing bytes behind a live record are
    /// logged as corrupt state but reported to the caller as not found.
    /// Releases bytes written for a store that did not commit. Failures are
    /// logged and the bytes left to `reclaim_orphans`.
    async fn discard_content(&self, reference: &StorageRef) {
        if let Err(e) = self.content.delete(reference).await {
            warn!(
                reference = %reference,
                error = %e,
                "Failed to roll back uncommitted content; left for reclamation"
            );
        }
    }

    fn missing_content(&self, record: &FileRecord, err: AppError) -> AppError {
        if err.kind != ErrorKind::NotFound {
            return err;
        }
        error!(
            file_id = %record.file_id,
            error = %err,
            "Metadata references missing content"
        );
        let corrupt = AppError::with_source(
            ErrorKind::CorruptState,
            format!("Content missing for file {}", record.file_id),
            err,
        );
        AppError::with_source(
            ErrorKind::NotFound,
            format!("File not found: {}", record.file_id),
            corrupt,
        )
    }
}

/// Most recently updated first; ties broken by creation time, then id.
pub(crate) fn sort_recent_first(files: &mut [FileRecord]) {
    files.sort_by(|a, b| {
        b.updated_at
            .cmp(&a.updated_at)
            .then(b.created_at.cmp(&a.created_at))
            .then(a.file_id.cmp(&b.file_id))
    });
}

fn not_found(file_id: &FileId) -> AppError {
    AppError::not_found(format!("File not found: {file_id}"))
}
