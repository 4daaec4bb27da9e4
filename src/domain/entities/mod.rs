//! Core domain entities.

mod bang;
mod directory;
mod resolution;

pub use bang::{BangEntry, PLACEHOLDER};
pub use directory::{CacheRecord, DirectorySnapshot, VersionStamp, content_hash};
pub use resolution::Resolution;
