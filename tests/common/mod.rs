#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;
use unbang::application::services::{DirectoryService, EdgeProxyService};
use unbang::domain::entities::CacheRecord;
use unbang::domain::error::DirectoryError;
use unbang::domain::repositories::{
    EdgeStore, PayloadSource, SnapshotStore, UpstreamClient,
};
use unbang::infrastructure::cache::MemoryEdgeStore;
use unbang::state::AppState;

/// A small directory in the upstream's raw JSON form.
pub const SAMPLE_DIRECTORY: &str = r#"[
  {"t":"g","d":"www.google.com","u":"https://www.google.com/search?q={{{s}}}"},
  {"t":"gh","d":"github.com","u":"https://github.com/search?q={{{s}}}"},
  {"t":"ghr","d":"github.com","u":"https://github.com/{{{s}}}"}
]"#;

/// In-memory snapshot store for integration tests.
pub struct MemorySnapshotStore {
    record: RwLock<Option<CacheRecord>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self {
            record: RwLock::new(None),
        }
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn read(&self) -> Result<Option<CacheRecord>, DirectoryError> {
        Ok(self.record.read().await.clone())
    }

    async fn write(&self, record: &CacheRecord) -> Result<(), DirectoryError> {
        *self.record.write().await = Some(record.clone());
        Ok(())
    }
}

/// Upstream stub returning a fixed body or a fixed failure, counting calls.
pub struct StaticUpstream {
    body: Option<String>,
    status: Option<u16>,
    calls: Arc<AtomicUsize>,
}

impl StaticUpstream {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            body: Some(body.into()),
            status: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing(status: u16) -> Self {
        Self {
            body: None,
            status: Some(status),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }
}

#[async_trait]
impl UpstreamClient for StaticUpstream {
    async fn fetch_directory(&self) -> Result<String, DirectoryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.body {
            Some(body) => Ok(body.clone()),
            None => Err(DirectoryError::upstream(self.status, "upstream stub failure")),
        }
    }
}

/// Builds a full application state over in-memory stores and the given
/// upstream stub.
pub fn create_test_state(upstream: StaticUpstream) -> AppState {
    let edge_store: Arc<dyn EdgeStore> = Arc::new(MemoryEdgeStore::new());
    let edge = Arc::new(EdgeProxyService::new(edge_store, Arc::new(upstream)));

    let snapshot_store: Arc<dyn SnapshotStore> = Arc::new(MemorySnapshotStore::new());
    let payload_source: Arc<dyn PayloadSource> = edge.clone();
    let directory = DirectoryService::new(
        snapshot_store,
        payload_source,
        chrono::Duration::hours(24),
    );

    AppState::new(
        directory,
        edge,
        "g".to_string(),
        "http://localhost:3000".to_string(),
    )
}
