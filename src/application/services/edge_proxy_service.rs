//! Edge cache proxy fronting the upstream directory source.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::domain::entities::{VersionStamp, content_hash};
use crate::domain::error::DirectoryError;
use crate::domain::repositories::{DirectoryPayload, EdgeStore, PayloadSource, UpstreamClient};

/// A payload ready to be served, with the version metadata clients use for
/// staleness reasoning.
#[derive(Debug, Clone)]
pub struct ServedPayload {
    pub body: String,
    pub version: VersionStamp,
    pub cache_hit: bool,
}

/// Result of one scheduled refresh pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Upstream content matched the stored fingerprint; only the stored
    /// timestamp moved forward.
    Unchanged,
    /// New content was stored; served bytes and fingerprint changed.
    Updated,
}

/// Serves the directory payload while shielding the upstream source from
/// repeated fetches.
///
/// Concurrent cache misses may each fetch upstream and each write. The race
/// is benign: writes are idempotent and whichever lands last describes the
/// same or newer state, so no distributed lock is used.
pub struct EdgeProxyService {
    store: Arc<dyn EdgeStore>,
    upstream: Arc<dyn UpstreamClient>,
}

impl EdgeProxyService {
    pub fn new(store: Arc<dyn EdgeStore>, upstream: Arc<dyn UpstreamClient>) -> Self {
        Self { store, upstream }
    }

    /// Returns the directory payload, from cache when possible.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::UpstreamUnavailable`] when the cache is
    /// empty and the upstream fetch fails; the upstream status is carried
    /// through so the handler can propagate it. Nothing is cached on
    /// failure.
    pub async fn payload(&self) -> Result<ServedPayload, DirectoryError> {
        let cached_body = self.store.payload().await.unwrap_or_else(|e| {
            error!("Edge cache payload read failed: {}", e);
            None
        });
        let cached_version = self.store.version().await.unwrap_or_else(|e| {
            error!("Edge cache version read failed: {}", e);
            None
        });

        if let (Some(body), Some(version)) = (cached_body, cached_version) {
            return Ok(ServedPayload {
                body,
                version,
                cache_hit: true,
            });
        }

        let body = self.upstream.fetch_directory().await?;
        let version = VersionStamp::for_content(&body);

        if let Err(e) = self.store.put_payload(&body, &version).await {
            warn!("Edge cache write failed: {}", e);
        }

        info!(
            "Edge cache populated from upstream: {} bytes, hash {}",
            body.len(),
            version.content_hash
        );

        Ok(ServedPayload {
            body,
            version,
            cache_hit: false,
        })
    }

    /// Change-aware refresh: re-fetches upstream and rewrites the stored
    /// payload only when its fingerprint actually changed.
    ///
    /// The served `ETag` therefore changes if and only if content changed;
    /// an unchanged pass just advances the stored timestamp. Safe to re-run
    /// if interrupted.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::UpstreamUnavailable`] when the upstream
    /// fetch fails; the previously cached entry remains authoritative.
    pub async fn refresh(&self) -> Result<RefreshOutcome, DirectoryError> {
        let body = self.upstream.fetch_directory().await?;
        let hash = content_hash(&body);

        let previous = self.store.version().await.unwrap_or_else(|e| {
            error!("Edge cache version read failed: {}", e);
            None
        });

        let stamp = VersionStamp::new(Utc::now(), hash);

        match previous {
            Some(version) if version.content_hash == stamp.content_hash => {
                if let Err(e) = self.store.put_version(&stamp).await {
                    warn!("Edge cache version write failed: {}", e);
                }
                debug!("Refresh: content unchanged, timestamp advanced");
                Ok(RefreshOutcome::Unchanged)
            }
            _ => {
                if let Err(e) = self.store.put_payload(&body, &stamp).await {
                    warn!("Edge cache write failed: {}", e);
                }
                info!("Refresh: content changed, new hash {}", stamp.content_hash);
                Ok(RefreshOutcome::Updated)
            }
        }
    }

    /// Reports whether the backing cache store is reachable.
    pub async fn health_check(&self) -> bool {
        self.store.health_check().await
    }
}

/// The directory loader fetches through the proxy, so loader traffic and
/// `GET /bangs.js` traffic share one cache and one upstream fetch path.
#[async_trait]
impl PayloadSource for EdgeProxyService {
    async fn fetch_payload(&self) -> Result<DirectoryPayload, DirectoryError> {
        let served = self.payload().await?;
        Ok(DirectoryPayload {
            body: served.body,
            content_hash: Some(served.version.content_hash),
        })
    }
}
