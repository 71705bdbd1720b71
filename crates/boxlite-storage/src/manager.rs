//! Storage manager: builds the configured content store.

use std::sync::Arc;

use tracing::info;

use boxlite_core::config::storage::StorageConfig;
use boxlite_core::error::AppError;
use boxlite_core::result::AppResult;
use boxlite_core::traits::storage::ContentStore;

/// Wraps the content store selected by configuration.
#[derive(Debug, Clone)]
pub struct StorageManager {
    /// The active content store.
    inner: Arc<dyn ContentStore>,
}

impl StorageManager {
    /// Create a storage manager from configuration.
    pub async fn new(config: &StorageConfig) -> AppResult<Self> {
        let inner: Arc<dyn ContentStore> = match config.provider.as_str() {
            #[cfg(feature = "local")]
            "local" => {
                info!(root = %config.local.root_path, "Initializing local content store");
                let store =
                    crate::providers::local::LocalContentStore::new(&config.local.root_path)
                        .await?;
                Arc::new(store)
            }
            #[cfg(feature = "memory")]
            "memory" => {
                info!("Initializing in-memory content store");
                Arc::new(crate::providers::memory::MemoryContentStore::new())
            }
            other => {
                return Err(AppError::configuration(format!(
                    "Unknown storage provider: '{other}'. Supported: memory, local"
                )));
            }
        };

        Ok(Self { inner })
    }

    /// Create a storage manager from an existing store (for testing).
    pub fn from_provider(provider: Arc<dyn ContentStore>) -> Self {
        Self { inner: provider }
    }

    /// Shared handle to the active content store.
    pub fn provider(&self) -> Arc<dyn ContentStore> {
        Arc::clone(&self.inner)
    }

    /// Check the active store, failing if it reports unhealthy.
    pub async fn ensure_healthy(&self) -> AppResult<()> {
        if self.inner.health_check().await? {
            Ok(())
        } else {
            Err(AppError::storage(format!(
                "Content store '{}' failed its health check",
                self.inner.provider_type()
            )))
        }
    }
}
