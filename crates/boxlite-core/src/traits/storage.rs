//! Content store trait for pluggable byte storage backends.

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;

use crate::result::AppResult;
use crate::types::id::StorageRef;

/// A byte stream type used for reading file contents.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// Trait for raw content storage backends.
///
/// Content is addressed by an opaque [`StorageRef`] chosen by the caller.
/// Implementations live in `boxlite-storage` (in-memory and local
/// filesystem). A missing object is reported as `ErrorKind::NotFound`.
#[async_trait]
pub trait ContentStore: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g., "memory", "local").
    fn provider_type(&self) -> &str;

    /// Check whether the backend is usable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Durably write bytes under the given reference, replacing any
    /// previous content atomically.
    async fn write(&self, reference: &StorageRef, data: Bytes) -> AppResult<()>;

    /// Read the complete content into memory.
    async fn read_bytes(&self, reference: &StorageRef) -> AppResult<Bytes>;

    /// Open the content as a byte stream.
    async fn read(&self, reference: &StorageRef) -> AppResult<ByteStream>;

    /// Release the content. Deleting a missing reference is not an error.
    async fn delete(&self, reference: &StorageRef) -> AppResult<()>;

    /// Check whether content exists for the reference.
    async fn exists(&self, reference: &StorageRef) -> AppResult<bool>;

    /// Enumerate every reference currently holding content.
    async fn list_references(&self) -> AppResult<Vec<StorageRef>>;
}
