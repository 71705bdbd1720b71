//! Content store providers.

#[cfg(feature = "local")]
pub mod local;
#[cfg(feature = "memory")]
pub mod memory;

#[cfg(feature = "local")]
pub use local::LocalContentStore;
#[cfg(feature = "memory")]
pub use memory::MemoryContentStore;
