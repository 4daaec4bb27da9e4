//! In-process edge cache store.

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::entities::VersionStamp;
use crate::domain::repositories::{CacheResult, EdgeStore};

#[derive(Default)]
struct MemoryState {
    payload: Option<String>,
    version: Option<VersionStamp>,
}

/// Edge cache held in process memory.
///
/// Used when Redis is not configured (single-node deployments) and in tests.
/// The cache is lost on restart; the first request after startup falls
/// through to the upstream source.
pub struct MemoryEdgeStore {
    state: RwLock<MemoryState>,
}

impl MemoryEdgeStore {
    pub fn new() -> Self {
        debug!("Using in-memory edge cache");
        Self {
            state: RwLock::new(MemoryState::default()),
        }
    }
}

impl Default for MemoryEdgeStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EdgeStore for MemoryEdgeStore {
    async fn payload(&self) -> CacheResult<Option<String>> {
        Ok(self.state.read().await.payload.clone())
    }

    async fn version(&self) -> CacheResult<Option<VersionStamp>> {
        Ok(self.state.read().await.version.clone())
    }

    async fn put_payload(&self, payload: &str, version: &VersionStamp) -> CacheResult<()> {
        let mut state = self.state.write().await;
        state.payload = Some(payload.to_string());
        state.version = Some(version.clone());
        Ok(())
    }

    async fn put_version(&self, version: &VersionStamp) -> CacheResult<()> {
        self.state.write().await.version = Some(version.clone());
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn test_starts_empty() {
        let store = MemoryEdgeStore::new();

        assert!(store.payload().await.unwrap().is_none());
        assert!(store.version().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_payload_stores_both_keys() {
        let store = MemoryEdgeStore::new();
        let stamp = VersionStamp::new(Utc::now(), "aa".to_string());

        store.put_payload("[]", &stamp).await.unwrap();

        assert_eq!(store.payload().await.unwrap().as_deref(), Some("[]"));
        assert_eq!(store.version().await.unwrap().unwrap().content_hash, "aa");
    }

    #[tokio::test]
    async fn test_put_version_leaves_payload_untouched() {
        let store = MemoryEdgeStore::new();
        let first = VersionStamp::new(Utc::now(), "aa".to_string());
        store.put_payload("[1]", &first).await.unwrap();

        let newer = VersionStamp::new(Utc::now(), "aa".to_string());
        store.put_version(&newer).await.unwrap();

        assert_eq!(store.payload().await.unwrap().as_deref(), Some("[1]"));
        assert_eq!(store.version().await.unwrap().unwrap().timestamp, newer.timestamp);
    }
}
