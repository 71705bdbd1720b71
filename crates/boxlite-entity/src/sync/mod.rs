//! Sync entities: version descriptors and resolution results.

pub mod descriptor;

pub use descriptor::{ConflictStatus, ResolvedVersion, VersionDescriptor, VersionTag};
