//! Failure taxonomy of the directory pipeline.

/// Errors that can occur while loading, caching or serving the directory.
///
/// Upstream and parse failures are recovered locally by the loader's fallback
/// chain and only logged; the sole externally visible failure is an upstream
/// non-2xx at the edge proxy when its cache is still empty.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    /// Network failure or non-2xx response from the upstream source.
    #[error("upstream directory unavailable: {message}")]
    UpstreamUnavailable {
        /// Upstream HTTP status, when the failure carried one.
        status: Option<u16>,
        message: String,
    },

    /// Malformed JSON or failed script-assignment extraction.
    #[error("directory payload unparseable: {0}")]
    PayloadUnparseable(String),

    /// Durable store read or write failed.
    #[error("snapshot store error: {0}")]
    StoreCorrupt(String),

    /// Every fallback level exhausted. Unreachable while the embedded
    /// directory stays non-empty.
    #[error("no directory available from any source")]
    NoDirectoryAvailable,
}

impl DirectoryError {
    pub fn upstream(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::UpstreamUnavailable {
            status,
            message: message.into(),
        }
    }
}
