//! Share access: opens or updates files through a share token.

use std::sync::Arc;

use bytes::Bytes;
use serde::Serialize;
use tracing::info;

use boxlite_core::error::{AppError, ErrorKind};
use boxlite_core::result::AppResult;
use boxlite_entity::file::FileRecord;
use boxlite_entity::share::ShareRecord;

use super::registry::ShareRegistry;
use crate::file::FileService;

/// A file opened through a share link.
#[derive(Debug, Clone, Serialize)]
pub struct SharedFile {
    /// The share after this access was counted.
    pub share: ShareRecord,
    /// The shared file's record.
    pub file: FileRecord,
    /// The file content.
    #[serde(skip)]
    pub data: Bytes,
}

/// Handles access to files by share token.
#[derive(Debug, Clone)]
pub struct AccessService {
    /// Share registry.
    registry: Arc<ShareRegistry>,
    /// File service for content.
    files: Arc<FileService>,
}

impl AccessService {
    /// Creates a new access service.
    pub fn new(registry: Arc<ShareRegistry>, files: Arc<FileService>) -> Self {
        Self { registry, files }
    }

    /// Validates `token` and returns the shared file with its content.
    ///
    /// A link whose file has been deleted is invalidated and reported as
    /// `NotFound`.
    pub async fn open_shared(&self, token: &str) -> AppResult<SharedFile> {
        let share = self.registry.validate(token)?;
        if !share.permission_level.allows_read() {
            return Err(AppError::forbidden("Share link does not grant access"));
        }

        let (file, data) = self
            .files
            .fetch(&share.file_id)
            .await
            .map_err(|e| self.on_missing_file(&share, e))?;

        info!(
            token = %share.token_hint(),
            file_id = %file.file_id,
            access_count = share.access_count,
            "Shared file opened"
        );
        Ok(SharedFile { share, file, data })
    }

    /// Replaces a shared file's content. Requires a write share.
    pub async fn write_shared(&self, token: &str, data: Bytes) -> AppResult<FileRecord> {
        let share = self.registry.validate(token)?;
        if !share.permission_level.allows_write() {
            return Err(AppError::forbidden("Share link does not allow writes"));
        }

        let record = self
            .files
            .overwrite(&share.file_id, data, |_| Ok(()))
            .await
            .map_err(|e| self.on_missing_file(&share, e))?;

        info!(
            token = %share.token_hint(),
            file_id = %record.file_id,
            version = record.version,
            "Shared file updated"
        );
        Ok(record)
    }

    /// Invalidates the share when its file record is gone. Missing bytes
    /// behind a live record leave the share alone.
    fn on_missing_file(&self, share: &ShareRecord, err: AppError) -> AppError {
        if err.is(ErrorKind::NotFound) && !err.caused_by(ErrorKind::CorruptState) {
            self.registry.invalidate(&share.token);
        }
        err
    }
}
