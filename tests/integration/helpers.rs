//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, TimeZone, Utc};

use boxlite_core::config::AppConfig;
use boxlite_core::traits::clock::{Clock, ManualClock};
use boxlite_core::types::id::UserId;
use boxlite_entity::file::FileRecord;
use boxlite_service::ServiceContainer;
use boxlite_storage::StorageManager;
use boxlite_storage::providers::{LocalContentStore, MemoryContentStore};

/// Test application context
pub struct TestApp {
    /// All services, wired as the binary wires them
    pub services: ServiceContainer,
    /// Clock driving every timestamp
    pub clock: Arc<ManualClock>,
    /// Direct handle on the in-memory content store
    pub content: MemoryContentStore,
    /// Application config
    pub config: AppConfig,
}

impl TestApp {
    /// Create a new test application over in-memory storage
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    /// Create a test application with custom settings
    pub fn with_config(config: AppConfig) -> Self {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap(),
        ));
        let content = MemoryContentStore::new();
        let storage = StorageManager::from_provider(Arc::new(content.clone()));
        let services = ServiceContainer::with_storage(&config, storage, clock.clone());
        Self {
            services,
            clock,
            content,
            config,
        }
    }

    /// Current test time
    pub fn clock_now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Current test time as epoch milliseconds
    pub fn clock_millis(&self) -> i64 {
        self.clock.now().timestamp_millis()
    }

    /// Store a file for `owner` at the root
    pub async fn upload(&self, owner: &str, name: &str, body: &str) -> FileRecord {
        self.services
            .files
            .store(&UserId::from(owner), Bytes::from(body.to_string()), name, None)
            .await
            .expect("upload failed")
    }
}

/// Build services over a local content store rooted at `root`
pub async fn local_app(root: &std::path::Path) -> (ServiceContainer, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::default());
    let store = LocalContentStore::new(root.to_str().expect("utf-8 temp path"))
        .await
        .expect("Failed to init local store");
    let storage = StorageManager::from_provider(Arc::new(store));
    let services = ServiceContainer::with_storage(&AppConfig::default(), storage, clock.clone());
    (services, clock)
}

/// Shorthand for a user id
pub fn user(id: &str) -> UserId {
    UserId::from(id)
}
