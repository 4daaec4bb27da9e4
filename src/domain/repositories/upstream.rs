//! Traits for fetching the directory payload.

use crate::domain::error::DirectoryError;
use async_trait::async_trait;

/// A fetched directory payload plus whatever version metadata the source
/// exposed alongside it.
#[derive(Debug, Clone)]
pub struct DirectoryPayload {
    pub body: String,
    /// Content fingerprint reported by the source, when it has one. The
    /// loader computes its own hash otherwise.
    pub content_hash: Option<String>,
}

/// Raw upstream directory source (no caching in front of it).
///
/// # Implementations
///
/// - [`crate::infrastructure::upstream::HttpUpstreamClient`] - reqwest-backed
///   HTTP client with retry
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UpstreamClient: Send + Sync {
    /// Fetches the directory body from the upstream source.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::UpstreamUnavailable`] on network failure or
    /// a non-2xx response, carrying the upstream status when there was one.
    async fn fetch_directory(&self) -> Result<String, DirectoryError>;
}

/// Where the directory loader gets its payload from.
///
/// In production this is the in-process edge proxy, so loader traffic and
/// `GET /bangs.js` traffic share one cache and one upstream fetch path.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PayloadSource: Send + Sync {
    /// Fetches the current directory payload.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::UpstreamUnavailable`] when neither cache nor
    /// upstream can produce a body.
    async fn fetch_payload(&self) -> Result<DirectoryPayload, DirectoryError>;
}
