//! # boxlite-entity
//!
//! Domain entity models for Boxlite. Every struct in this crate is either
//! a stored record (files, shares) or a transient value object exchanged
//! with callers (sync version descriptors). All entities derive `Debug`,
//! `Clone`, `Serialize`, and `Deserialize`.

pub mod file;
pub mod share;
pub mod sync;
