//! File management: metadata records and their content.

pub mod metadata;
pub mod service;

pub use metadata::MetadataStore;
pub use service::FileService;
