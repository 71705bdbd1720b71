//! In-memory content store backed by a concurrent map.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use tracing::debug;

use boxlite_core::error::AppError;
use boxlite_core::result::AppResult;
use boxlite_core::traits::storage::{ByteStream, ContentStore};
use boxlite_core::types::id::StorageRef;

/// Content store that keeps every object in process memory.
///
/// Content lives as long as the store; cloning shares the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryContentStore {
    objects: Arc<DashMap<StorageRef, Bytes>>,
}

impl MemoryContentStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the store holds no objects.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    fn provider_type(&self) -> &str {
        "memory"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }

    async fn write(&self, reference: &StorageRef, data: Bytes) -> AppResult<()> {
        debug!(reference = %reference, bytes = data.len(), "Stored content in memory");
        self.objects.insert(reference.clone(), data);
        Ok(())
    }

    async fn read_bytes(&self, reference: &StorageRef) -> AppResult<Bytes> {
        self.objects
            .get(reference)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| AppError::not_found(format!("Content not found: {reference}")))
    }

    async fn read(&self, reference: &StorageRef) -> AppResult<ByteStream> {
        let data = self.read_bytes(reference).await?;
        Ok(Box::pin(futures::stream::once(async move {
            Ok::<_, std::io::Error>(data)
        })))
    }

    async fn delete(&self, reference: &StorageRef) -> AppResult<()> {
        self.objects.remove(reference);
        Ok(())
    }

    async fn exists(&self, reference: &StorageRef) -> AppResult<bool> {
        Ok(self.objects.contains_key(reference))
    }

    async fn list_references(&self) -> AppResult<Vec<StorageRef>> {
        let mut references: Vec<StorageRef> =
            self.objects.iter().map(|entry| entry.key().clone()).collect();
        references.sort();
        Ok(references)
    }
}
