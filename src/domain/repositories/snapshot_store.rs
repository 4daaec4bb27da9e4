//! Persistent snapshot cache trait.

use crate::domain::entities::CacheRecord;
use crate::domain::error::DirectoryError;
use async_trait::async_trait;

/// Durable storage for the last successfully fetched directory.
///
/// One logical record: the serialized snapshot plus its version stamp,
/// always written together.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::FileSnapshotStore`] - JSON file with
///   atomic replace
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Returns the last stored record.
    ///
    /// A record that was never written, or that fails to deserialize, yields
    /// `Ok(None)`: corruption is treated as a cache miss, logged by the
    /// implementation, never thrown at the loader.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::StoreCorrupt`] only for I/O failures that
    /// are not plain absence (e.g. permission errors).
    async fn read(&self) -> Result<Option<CacheRecord>, DirectoryError>;

    /// Atomically replaces the stored record.
    ///
    /// Snapshot and stamp land together; a partial write must never be
    /// observable to a concurrent reader.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::StoreCorrupt`] when the write fails.
    async fn write(&self, record: &CacheRecord) -> Result<(), DirectoryError>;
}
