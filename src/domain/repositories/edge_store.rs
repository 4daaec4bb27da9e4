//! Edge cache store trait and error types.

use crate::domain::entities::VersionStamp;
use async_trait::async_trait;
use std::fmt;

/// Errors that can occur during edge cache operations.
#[derive(Debug)]
pub enum CacheError {
    ConnectionError(String),
    OperationError(String),
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::ConnectionError(e) => write!(f, "Cache connection error: {}", e),
            Self::OperationError(e) => write!(f, "Cache operation error: {}", e),
        }
    }
}

impl std::error::Error for CacheError {}

/// Result type for edge cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Durable cache fronting the upstream directory, keyed by two fixed
/// logical slots: the raw payload body and its version stamp.
///
/// Implementations must be thread-safe and fail open: read errors degrade to
/// cache misses and write errors are logged, so a broken store turns the
/// proxy into a pass-through rather than an outage.
///
/// Two concurrent misses may both fetch upstream and both write. That race
/// is benign: writes are idempotent and the later one describes the same or
/// newer state.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisEdgeStore`] - shared Redis-backed store
/// - [`crate::infrastructure::cache::MemoryEdgeStore`] - in-process store for
///   single-node deployments and tests
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EdgeStore: Send + Sync {
    /// Returns the cached payload body, or `None` on miss or read error.
    async fn payload(&self) -> CacheResult<Option<String>>;

    /// Returns the cached version stamp, or `None` on miss or read error.
    async fn version(&self) -> CacheResult<Option<VersionStamp>>;

    /// Stores payload and version together. The only operation that changes
    /// served content.
    async fn put_payload(&self, payload: &str, version: &VersionStamp) -> CacheResult<()>;

    /// Replaces only the version stamp, leaving payload bytes untouched
    /// (content-unchanged refresh fast path).
    async fn put_version(&self, version: &VersionStamp) -> CacheResult<()>;

    /// Checks if the cache backend is reachable.
    ///
    /// Used by the health endpoint to report cache status.
    async fn health_check(&self) -> bool;
}
