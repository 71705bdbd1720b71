//! # boxlite-service
//!
//! Business logic service layer for Boxlite. The file service owns the
//! metadata store and drives the content store; the share registry and
//! sync service consume file records by id.
//!
//! Services follow constructor injection; all dependencies are provided
//! at construction time via `Arc` references.

pub mod container;
pub mod file;
pub mod share;
pub mod sync;

pub use container::ServiceContainer;
pub use file::{FileService, MetadataStore};
pub use share::{AccessService, LinkService, ShareRegistry, SharedFile};
pub use sync::{SyncService, resolve};
