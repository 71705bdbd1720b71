//! File entity model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use boxlite_core::types::id::{FileId, FolderId, StorageRef, UserId};

use crate::sync::{VersionDescriptor, VersionTag};

/// A file stored in Boxlite.
///
/// Serialization is output only: the storage reference is withheld, so a
/// serialized record cannot be read back into a usable one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileRecord {
    /// Unique file identifier.
    pub file_id: FileId,
    /// The user who uploaded the file.
    pub owner_id: UserId,
    /// Logical parent folder, if any.
    pub folder_id: Option<FolderId>,
    /// Client-supplied file name.
    pub original_name: String,
    /// Size of the current content in bytes.
    pub size_bytes: u64,
    /// Where the content store keeps the bytes. Never sent to callers.
    #[serde(skip_serializing)]
    pub storage_reference: StorageRef,
    /// When the file was created.
    pub created_at: DateTime<Utc>,
    /// When the file content or metadata last changed.
    pub updated_at: DateTime<Utc>,
    /// Content version, starting at 1.
    pub version: u64,
}

impl FileRecord {
    /// Whether `user` owns this file.
    pub fn is_owned_by(&self, user: &UserId) -> bool {
        &self.owner_id == user
    }

    /// Get the file extension (lowercase), if any.
    pub fn extension(&self) -> Option<String> {
        self.original_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
    }

    /// Describe this record as the local side of a sync comparison.
    pub fn descriptor(&self) -> VersionDescriptor {
        VersionDescriptor {
            file_id: self.file_id.clone(),
            version: Some(VersionTag::Number(self.version as i64)),
            modified_at: Some(self.updated_at),
            content_marker: None,
        }
    }
}
