//! Redis-backed edge cache store.

use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use tracing::{debug, error, info, warn};

use crate::domain::entities::VersionStamp;
use crate::domain::repositories::{CacheError, CacheResult, EdgeStore};

/// Shared edge cache backed by Redis.
///
/// Uses connection pooling via `ConnectionManager` for efficient connection
/// reuse. All operations are fail-open: read errors degrade to cache misses
/// and write errors are logged, so a broken Redis turns the proxy into a
/// pass-through rather than an outage.
pub struct RedisEdgeStore {
    client: ConnectionManager,
    payload_key: String,
    version_key: String,
}

impl RedisEdgeStore {
    /// Connects to Redis and validates the connection with a PING.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::ConnectionError`] if the URL is invalid, the
    /// connection cannot be established, or the PING health check fails.
    pub async fn connect(redis_url: &str) -> CacheResult<Self> {
        info!("Connecting to Redis at {}", redis_url);

        let client = Client::open(redis_url).map_err(|e| {
            CacheError::ConnectionError(format!("Failed to create Redis client: {}", e))
        })?;

        let manager = ConnectionManager::new(client).await.map_err(|e| {
            CacheError::ConnectionError(format!("Failed to connect to Redis: {}", e))
        })?;

        let mut test_conn = manager.clone();
        test_conn
            .ping::<()>()
            .await
            .map_err(|e| CacheError::ConnectionError(format!("Redis PING failed: {}", e)))?;

        info!("✓ Connected to Redis");

        Ok(Self {
            client: manager,
            payload_key: "bangs:payload".to_string(),
            version_key: "bangs:version".to_string(),
        })
    }
}

#[async_trait]
impl EdgeStore for RedisEdgeStore {
    async fn payload(&self) -> CacheResult<Option<String>> {
        let mut conn = self.client.clone();

        match conn.get::<_, Option<String>>(&self.payload_key).await {
            Ok(Some(body)) => {
                debug!("Edge cache HIT: payload ({} bytes)", body.len());
                Ok(Some(body))
            }
            Ok(None) => {
                debug!("Edge cache MISS: payload");
                Ok(None)
            }
            Err(e) => {
                error!("Redis GET error for {}: {}", self.payload_key, e);
                Ok(None)
            }
        }
    }

    async fn version(&self) -> CacheResult<Option<VersionStamp>> {
        let mut conn = self.client.clone();

        match conn.get::<_, Option<String>>(&self.version_key).await {
            Ok(Some(raw)) => match serde_json::from_str::<VersionStamp>(&raw) {
                Ok(version) => Ok(Some(version)),
                Err(e) => {
                    warn!("Stored version stamp is corrupt, treating as absent: {}", e);
                    Ok(None)
                }
            },
            Ok(None) => Ok(None),
            Err(e) => {
                error!("Redis GET error for {}: {}", self.version_key, e);
                Ok(None)
            }
        }
    }

    async fn put_payload(&self, payload: &str, version: &VersionStamp) -> CacheResult<()> {
        let raw_version = serde_json::to_string(version)
            .map_err(|e| CacheError::OperationError(format!("version serialization: {e}")))?;
        let mut conn = self.client.clone();

        let stored: Result<(), _> = redis::pipe()
            .set(&self.payload_key, payload)
            .set(&self.version_key, raw_version)
            .query_async(&mut conn)
            .await;

        match stored {
            Ok(()) => {
                debug!(
                    "Edge cache SET: payload ({} bytes), hash {}",
                    payload.len(),
                    version.content_hash
                );
                Ok(())
            }
            Err(e) => {
                warn!("Redis SET error for payload: {}", e);
                Ok(())
            }
        }
    }

    async fn put_version(&self, version: &VersionStamp) -> CacheResult<()> {
        let raw_version = serde_json::to_string(version)
            .map_err(|e| CacheError::OperationError(format!("version serialization: {e}")))?;
        let mut conn = self.client.clone();

        match conn.set::<_, _, ()>(&self.version_key, raw_version).await {
            Ok(()) => {
                debug!("Edge cache SET: version stamp only, hash {}", version.content_hash);
                Ok(())
            }
            Err(e) => {
                warn!("Redis SET error for version: {}", e);
                Ok(())
            }
        }
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.client.clone();
        conn.ping::<()>().await.is_ok()
    }
}
