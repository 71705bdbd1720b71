//! Share management: create, validate, revoke, and access shared files.

pub mod access;
pub mod link;
pub mod registry;

pub use access::{AccessService, SharedFile};
pub use link::LinkService;
pub use registry::ShareRegistry;
