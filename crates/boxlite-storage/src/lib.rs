//! # boxlite-storage
//!
//! Content store implementations for Boxlite. Supports an in-memory
//! provider for tests and single-process deployments, and a local
//! filesystem provider for durable storage.

pub mod manager;
pub mod providers;

pub use manager::StorageManager;
