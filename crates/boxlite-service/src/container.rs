//! Service container wiring the stores and services together.

use std::sync::Arc;

use tracing::info;

use boxlite_core::config::AppConfig;
use boxlite_core::result::AppResult;
use boxlite_core::traits::clock::Clock;
use boxlite_storage::StorageManager;

use crate::file::{FileService, MetadataStore};
use crate::share::{AccessService, ShareRegistry};
use crate::sync::SyncService;

/// Every store and service, built once at start-up and shared by handle.
#[derive(Debug, Clone)]
pub struct ServiceContainer {
    /// Content store selected by configuration.
    pub storage: StorageManager,
    /// File records.
    pub metadata: Arc<MetadataStore>,
    /// File operations.
    pub files: Arc<FileService>,
    /// Share links.
    pub shares: Arc<ShareRegistry>,
    /// Access through share links.
    pub access: Arc<AccessService>,
    /// Change feed and conflict checks.
    pub sync: Arc<SyncService>,
}

impl ServiceContainer {
    /// Builds all stores and services from configuration.
    pub async fn build(config: &AppConfig, clock: Arc<dyn Clock>) -> AppResult<Self> {
        let storage = StorageManager::new(&config.storage).await?;
        Ok(Self::with_storage(config, storage, clock))
    }

    /// Wires services around an already constructed content store.
    pub fn with_storage(
        config: &AppConfig,
        storage: StorageManager,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let content = storage.provider();
        let metadata = Arc::new(MetadataStore::new());
        let files = Arc::new(FileService::new(
            Arc::clone(&metadata),
            Arc::clone(&content),
            Arc::clone(&clock),
            config.storage.clone(),
        ));
        let shares = Arc::new(ShareRegistry::new(config.share.clone(), clock));
        let access = Arc::new(AccessService::new(
            Arc::clone(&shares),
            Arc::clone(&files),
        ));
        let sync = Arc::new(SyncService::new(Arc::clone(&metadata)));

        info!(provider = content.provider_type(), "Services initialized");

        Self {
            storage,
            metadata,
            files,
            shares,
            access,
            sync,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boxlite_core::error::ErrorKind;
    use boxlite_core::traits::clock::SystemClock;
    use boxlite_core::types::id::UserId;
    use bytes::Bytes;

    #[tokio::test]
    async fn test_build_shares_metadata() {
        let container = ServiceContainer::build(&AppConfig::default(), Arc::new(SystemClock))
            .await
            .unwrap();
        container.storage.ensure_healthy().await.unwrap();

        let owner = UserId::from("u1");
        let record = container
            .files
            .store(&owner, Bytes::from("abc"), "a.txt", None)
            .await
            .unwrap();
        assert_eq!(container.metadata.len(), 1);

        let changed = container.sync.get_updated_files(&owner, 0).await.unwrap();
        assert_eq!(changed[0].file_id, record.file_id);
    }

    #[tokio::test]
    async fn test_unknown_provider_fails() {
        let mut config = AppConfig::default();
        config.storage.provider = "tape".to_string();
        let err = ServiceContainer::build(&config, Arc::new(SystemClock))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }
}
