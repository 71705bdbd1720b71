//! Shared value types used across all Boxlite crates.

pub mod id;

pub use id::{FileId, FolderId, StorageRef, UserId};
