//! Change feed and server-side conflict checks.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use boxlite_core::error::AppError;
use boxlite_core::result::AppResult;
use boxlite_core::types::id::{FileId, UserId};
use boxlite_entity::file::FileRecord;
use boxlite_entity::sync::{ResolvedVersion, VersionDescriptor};

use super::resolver::resolve;
use crate::file::MetadataStore;
use crate::file::service::sort_recent_first;

/// Serves sync clients from the metadata store.
#[derive(Debug, Clone)]
pub struct SyncService {
    metadata: Arc<MetadataStore>,
}

impl SyncService {
    /// Creates a new sync service.
    pub fn new(metadata: Arc<MetadataStore>) -> Self {
        Self { metadata }
    }

    /// Files owned by `user_id` updated strictly after `since_ms` (Unix
    /// epoch milliseconds), most recently updated first.
    pub async fn get_updated_files(
        &self,
        user_id: &UserId,
        since_ms: i64,
    ) -> AppResult<Vec<FileRecord>> {
        if user_id.is_blank() {
            return Err(AppError::invalid_argument("User ID must be provided"));
        }
        if since_ms < 0 {
            return Err(AppError::invalid_argument(
                "Timestamp must be a non-negative epoch value",
            ));
        }
        let since = DateTime::<Utc>::from_timestamp_millis(since_ms).ok_or_else(|| {
            AppError::invalid_argument(format!("Timestamp out of range: {since_ms}"))
        })?;

        // Full precision: an edit later in the same millisecond counts.
        let mut files = self
            .metadata
            .find(|r| &r.owner_id == user_id && r.updated_at > since)
            .await;
        sort_recent_first(&mut files);

        debug!(user_id = %user_id, since_ms, count = files.len(), "Computed change feed");
        Ok(files)
    }

    /// Resolves a client's descriptor against the stored record.
    pub async fn check(
        &self,
        file_id: &FileId,
        remote: &VersionDescriptor,
    ) -> AppResult<ResolvedVersion> {
        let local = self
            .metadata
            .get(file_id)
            .await
            .ok_or_else(|| AppError::not_found(format!("File not found: {file_id}")))?;
        resolve(&local.descriptor(), remote)
    }
}
