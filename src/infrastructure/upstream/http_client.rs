//! HTTP client for the upstream directory source.

use std::time::Duration;

use async_trait::async_trait;
use tokio_retry::RetryIf;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, warn};

use crate::domain::error::DirectoryError;
use crate::domain::repositories::UpstreamClient;

/// Fetches the bang directory from its upstream HTTP source.
///
/// Transient transport errors are retried with jittered exponential backoff;
/// a non-2xx response is returned immediately so the caller can propagate
/// the upstream status.
pub struct HttpUpstreamClient {
    client: reqwest::Client,
    url: String,
}

impl HttpUpstreamClient {
    /// Builds a client for `url` with the given request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::UpstreamUnavailable`] if the underlying
    /// client cannot be constructed.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, DirectoryError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .map_err(|e| DirectoryError::upstream(None, format!("client build failed: {e}")))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn fetch_once(&self) -> Result<String, DirectoryError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| DirectoryError::upstream(None, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DirectoryError::upstream(
                Some(status.as_u16()),
                format!("upstream returned {status}"),
            ));
        }

        response
            .text()
            .await
            .map_err(|e| DirectoryError::upstream(None, format!("body read failed: {e}")))
    }
}

#[async_trait]
impl UpstreamClient for HttpUpstreamClient {
    async fn fetch_directory(&self) -> Result<String, DirectoryError> {
        let strategy = ExponentialBackoff::from_millis(200).map(jitter).take(2);

        let body = RetryIf::spawn(
            strategy,
            || async {
                self.fetch_once().await.inspect_err(|e| {
                    warn!("Upstream fetch attempt failed: {}", e);
                })
            },
            // Retrying a definitive upstream status would not change it;
            // only transport-level failures are worth another attempt.
            |e: &DirectoryError| {
                !matches!(e, DirectoryError::UpstreamUnavailable { status: Some(_), .. })
            },
        )
        .await?;

        debug!("Fetched {} bytes from {}", body.len(), self.url);
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_construction() {
        let client =
            HttpUpstreamClient::new("https://duckduckgo.com/bang.js", Duration::from_secs(10))
                .unwrap();

        assert_eq!(client.url(), "https://duckduckgo.com/bang.js");
    }
}
