//! Local filesystem content store.

use std::path::PathBuf;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use tracing::debug;

use boxlite_core::error::{AppError, ErrorKind};
use boxlite_core::result::AppResult;
use boxlite_core::traits::storage::{ByteStream, ContentStore};
use boxlite_core::types::id::StorageRef;

/// Suffix marking in-progress writes; never reported as content.
const TEMP_MARKER: &str = ".partial-";

/// Content store that keeps each object in its own file under a root
/// directory, fanned out by the first two characters of the reference.
#[derive(Debug, Clone)]
pub struct LocalContentStore {
    /// Root directory for all stored content.
    root: PathBuf,
}

impl LocalContentStore {
    /// Create a new local store rooted at the given path.
    pub async fn new(root_path: &str) -> AppResult<Self> {
        let root = PathBuf::from(root_path);
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create storage root: {}", root.display()),
                e,
            )
        })?;
        Ok(Self { root })
    }

    /// Resolve a reference to its path, rejecting anything that could
    /// escape the root.
    fn resolve(&self, reference: &StorageRef) -> AppResult<PathBuf> {
        let name = reference.as_str();
        let valid = name.len() >= 2
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(AppError::invalid_argument(format!(
                "Malformed storage reference: {name}"
            )));
        }
        Ok(self.root.join(&name[..2]).join(name))
    }
}

fn storage_err(action: &str, reference: &StorageRef, e: std::io::Error) -> AppError {
    if e.kind() == std::io::ErrorKind::NotFound {
        AppError::not_found(format!("Content not found: {reference}"))
    } else {
        AppError::with_source(
            ErrorKind::Storage,
            format!("Failed to {action} content: {reference}"),
            e,
        )
    }
}

#[async_trait]
impl ContentStore for LocalContentStore {
    fn provider_type(&self) -> &str {
        "local"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(fs::metadata(&self.root)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false))
    }

    async fn write(&self, reference: &StorageRef, data: Bytes) -> AppResult<()> {
        let full_path = self.resolve(reference)?;
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| storage_err("prepare", reference, e))?;
        }

        // Write beside the target, sync, then rename over it so readers
        // never see a half-written object.
        let temp_path = full_path.with_file_name(format!(
            "{}{}{}",
            reference,
            TEMP_MARKER,
            uuid::Uuid::new_v4().simple()
        ));
        let mut file = fs::File::create(&temp_path)
            .await
            .map_err(|e| storage_err("create", reference, e))?;
        file.write_all(&data)
            .await
            .map_err(|e| storage_err("write", reference, e))?;
        file.sync_all()
            .await
            .map_err(|e| storage_err("sync", reference, e))?;
        drop(file);

        if let Err(e) = fs::rename(&temp_path, &full_path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(storage_err("commit", reference, e));
        }

        debug!(reference = %reference, bytes = data.len(), "Wrote content");
        Ok(())
    }

    async fn read_bytes(&self, reference: &StorageRef) -> AppResult<Bytes> {
        let full_path = self.resolve(reference)?;
        let data = fs::read(&full_path)
            .await
            .map_err(|e| storage_err("read", reference, e))?;
        Ok(Bytes::from(data))
    }

    async fn read(&self, reference: &StorageRef) -> AppResult<ByteStream> {
        let full_path = self.resolve(reference)?;
        let file = fs::File::open(&full_path)
            .await
            .map_err(|e| storage_err("open", reference, e))?;

        Ok(Box::pin(ReaderStream::new(file)))
    }

    async fn delete(&self, reference: &StorageRef) -> AppResult<()> {
        let full_path = self.resolve(reference)?;
        match fs::remove_file(&full_path).await {
            Ok(()) => {
                debug!(reference = %reference, "Deleted content");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(storage_err("delete", reference, e)),
        }
    }

    async fn exists(&self, reference: &StorageRef) -> AppResult<bool> {
        let full_path = self.resolve(reference)?;
        match fs::metadata(&full_path).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(storage_err("stat", reference, e)),
        }
    }

    async fn list_references(&self) -> AppResult<Vec<StorageRef>> {
        let mut references = Vec::new();
        let mut buckets = fs::read_dir(&self.root).await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, "Failed to list storage root", e)
        })?;

        while let Some(bucket) = buckets.next_entry().await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, "Failed to read storage root entry", e)
        })? {
            let is_dir = bucket.file_type().await.map(|t| t.is_dir()).unwrap_or(false);
            if !is_dir {
                continue;
            }

            let mut entries = fs::read_dir(bucket.path()).await.map_err(|e| {
                AppError::with_source(ErrorKind::Storage, "Failed to list storage bucket", e)
            })?;
            while let Some(entry) = entries.next_entry().await.map_err(|e| {
                AppError::with_source(ErrorKind::Storage, "Failed to read storage bucket entry", e)
            })? {
                let name = entry.file_name().to_string_lossy().to_string();
                if !name.contains(TEMP_MARKER) {
                    references.push(StorageRef::from(name));
                }
            }
        }

        references.sort();
        Ok(references)
    }
}
