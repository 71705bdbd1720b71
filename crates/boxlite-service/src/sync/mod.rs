//! Sync support: change feeds and two-version conflict resolution.

pub mod resolver;
pub mod service;

pub use resolver::resolve;
pub use service::SyncService;
