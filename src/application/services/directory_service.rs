//! Directory loading: fetch-vs-cache orchestration, single-flight
//! coordination, and the multi-level fallback chain.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tokio::sync::{Mutex, RwLock, watch};
use tracing::{debug, info, warn};

use crate::domain::entities::{CacheRecord, DirectorySnapshot, VersionStamp, content_hash};
use crate::domain::error::DirectoryError;
use crate::domain::repositories::{PayloadSource, SnapshotStore};
use crate::utils::payload::parse_directory_payload;

type SharedLoad = watch::Receiver<Option<Arc<DirectorySnapshot>>>;

/// Produces directory snapshots for the resolver, balancing freshness
/// against availability.
///
/// At most one upstream fetch is outstanding at any instant: concurrent
/// callers that miss the fresh cache fan in on the same in-flight load and
/// observe the same result. Loading never fails: network and parse errors
/// degrade through stale cache down to the embedded directory.
///
/// Cheap to clone; clones share the same cache and single-flight slot.
#[derive(Clone)]
pub struct DirectoryService {
    inner: Arc<Inner>,
}

struct Inner {
    store: Arc<dyn SnapshotStore>,
    source: Arc<dyn PayloadSource>,
    ttl: Duration,
    /// Last published snapshot, swapped wholesale on refresh.
    current: RwLock<Option<Arc<DirectorySnapshot>>>,
    /// Single-flight slot; holds the receiver of the in-flight load.
    in_flight: Mutex<Option<SharedLoad>>,
}

impl DirectoryService {
    pub fn new(store: Arc<dyn SnapshotStore>, source: Arc<dyn PayloadSource>, ttl: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                source,
                ttl,
                current: RwLock::new(None),
                in_flight: Mutex::new(None),
            }),
        }
    }

    /// Returns a directory snapshot, fetching only when the cache is stale.
    ///
    /// Order: fresh published snapshot, fresh persistent record, then the
    /// single-flight load (joining an in-flight one if present).
    pub async fn snapshot(&self) -> Arc<DirectorySnapshot> {
        let now = Utc::now();

        if let Some(snapshot) = self.inner.current.read().await.clone()
            && now - snapshot.stamp().timestamp < self.inner.ttl
        {
            return snapshot;
        }

        match self.inner.store.read().await {
            Ok(Some(record)) if record.is_fresh_at(now, self.inner.ttl) => {
                debug!("Serving fresh snapshot cache ({} entries)", record.entries.len());
                return self.inner.publish(record.into_snapshot()).await;
            }
            Ok(_) => {}
            Err(e) => warn!("Snapshot cache read failed: {}", e),
        }

        self.load_shared().await
    }

    /// Forces a load through the single-flight gate, bypassing freshness
    /// checks. Used after the edge cache observed changed content.
    pub async fn reload(&self) -> Arc<DirectorySnapshot> {
        self.load_shared().await
    }

    /// Last published snapshot, if any, without triggering a load.
    pub async fn current(&self) -> Option<Arc<DirectorySnapshot>> {
        self.inner.current.read().await.clone()
    }

    /// Joins the in-flight load or starts a new one.
    async fn load_shared(&self) -> Arc<DirectorySnapshot> {
        let mut rx = {
            let mut slot = self.inner.in_flight.lock().await;
            match slot.as_ref() {
                Some(rx) => rx.clone(),
                None => {
                    let (tx, rx) = watch::channel(None);
                    *slot = Some(rx.clone());

                    let inner = Arc::clone(&self.inner);
                    tokio::spawn(async move {
                        let snapshot = inner.fetch_and_publish().await;
                        let _ = tx.send(Some(snapshot));
                        // Clear the slot so a later call can retry.
                        inner.in_flight.lock().await.take();
                    });

                    rx
                }
            }
        };

        let settled = rx
            .wait_for(|value| value.is_some())
            .await
            .ok()
            .and_then(|value| value.clone());

        match settled {
            Some(snapshot) => snapshot,
            // Load task died before publishing; degrade like a failed fetch.
            None => self.inner.fallback_chain().await,
        }
    }
}

impl Inner {
    /// One upstream fetch: parse, persist, publish. Any failure routes to
    /// the fallback chain and is logged, never propagated.
    async fn fetch_and_publish(&self) -> Arc<DirectorySnapshot> {
        let payload = match self.source.fetch_payload().await {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Directory fetch failed: {}", e);
                return self.fallback_chain().await;
            }
        };

        let entries = match parse_directory_payload(&payload.body) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Directory payload rejected: {}", DirectoryError::from(e));
                return self.fallback_chain().await;
            }
        };

        let hash = payload
            .content_hash
            .unwrap_or_else(|| content_hash(&payload.body));
        let record = CacheRecord::new(entries, VersionStamp::new(Utc::now(), hash));

        if let Err(e) = self.store.write(&record).await {
            // A failed cache write still leaves a usable snapshot in memory.
            warn!("Snapshot cache write failed: {}", e);
        }

        info!(
            "Directory refreshed: {} entries, hash {}",
            record.entries.len(),
            record.stamp.content_hash
        );

        self.publish(record.into_snapshot()).await
    }

    /// Stale persistent record, then last published snapshot, then the
    /// embedded directory.
    async fn fallback_chain(&self) -> Arc<DirectorySnapshot> {
        if let Ok(Some(record)) = self.store.read().await {
            info!("Serving stale snapshot cache ({} entries)", record.entries.len());
            return self.publish(record.into_snapshot()).await;
        }

        if let Some(snapshot) = self.current.read().await.clone() {
            return snapshot;
        }

        warn!("No cached directory available, serving embedded directory");
        self.publish(DirectorySnapshot::embedded()).await
    }

    async fn publish(&self, snapshot: DirectorySnapshot) -> Arc<DirectorySnapshot> {
        let snapshot = Arc::new(snapshot);
        *self.current.write().await = Some(snapshot.clone());
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::BangEntry;
    use crate::domain::error::DirectoryError;
    use crate::domain::repositories::{DirectoryPayload, MockPayloadSource, MockSnapshotStore};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const BODY: &str =
        r#"[{"t":"gh","d":"github.com","u":"https://github.com/search?q={{{s}}}"}]"#;

    fn ttl() -> Duration {
        Duration::hours(24)
    }

    fn fresh_record() -> CacheRecord {
        CacheRecord::new(
            vec![BangEntry::new("w", "en.wikipedia.org", "https://en.wikipedia.org/w?q={{{s}}}")],
            VersionStamp::new(Utc::now(), "cached".to_string()),
        )
    }

    fn stale_record() -> CacheRecord {
        CacheRecord::new(
            vec![BangEntry::new("old", "old.example.com", "https://old.example.com/?q={{{s}}}")],
            VersionStamp::new(Utc::now() - Duration::days(3), "stale".to_string()),
        )
    }

    fn service(store: MockSnapshotStore, source: MockPayloadSource) -> DirectoryService {
        DirectoryService::new(Arc::new(store), Arc::new(source), ttl())
    }

    #[tokio::test]
    async fn test_fresh_record_short_circuits_network() {
        let mut store = MockSnapshotStore::new();
        store.expect_read().times(1).returning(|| Ok(Some(fresh_record())));

        let mut source = MockPayloadSource::new();
        source.expect_fetch_payload().times(0);

        let service = service(store, source);
        let snapshot = service.snapshot().await;

        assert!(snapshot.lookup("w").is_some());
    }

    #[tokio::test]
    async fn test_published_snapshot_skips_store_on_second_call() {
        let mut store = MockSnapshotStore::new();
        store.expect_read().times(1).returning(|| Ok(Some(fresh_record())));

        let mut source = MockPayloadSource::new();
        source.expect_fetch_payload().times(0);

        let service = service(store, source);
        service.snapshot().await;
        // Second call is served from the published in-memory snapshot.
        let snapshot = service.snapshot().await;

        assert!(snapshot.lookup("w").is_some());
    }

    #[tokio::test]
    async fn test_stale_record_triggers_fetch_and_store_write() {
        let mut store = MockSnapshotStore::new();
        store.expect_read().returning(|| Ok(Some(stale_record())));
        store
            .expect_write()
            .times(1)
            .withf(|record| record.entries.len() == 1 && record.entries[0].trigger == "gh")
            .returning(|_| Ok(()));

        let mut source = MockPayloadSource::new();
        source.expect_fetch_payload().times(1).returning(|| {
            Ok(DirectoryPayload {
                body: BODY.to_string(),
                content_hash: None,
            })
        });

        let service = service(store, source);
        let snapshot = service.snapshot().await;

        assert!(snapshot.lookup("gh").is_some());
        assert!(snapshot.lookup("old").is_none());
    }

    #[tokio::test]
    async fn test_hash_from_response_metadata_wins_over_local() {
        let mut store = MockSnapshotStore::new();
        store.expect_read().returning(|| Ok(None));
        store
            .expect_write()
            .withf(|record| record.stamp.content_hash == "served-by-edge")
            .times(1)
            .returning(|_| Ok(()));

        let mut source = MockPayloadSource::new();
        source.expect_fetch_payload().returning(|| {
            Ok(DirectoryPayload {
                body: BODY.to_string(),
                content_hash: Some("served-by-edge".to_string()),
            })
        });

        let service = service(store, source);
        let snapshot = service.snapshot().await;

        assert_eq!(snapshot.stamp().content_hash, "served-by-edge");
    }

    #[tokio::test]
    async fn test_fetch_failure_falls_back_to_stale_record() {
        let mut store = MockSnapshotStore::new();
        store.expect_read().returning(|| Ok(Some(stale_record())));

        let mut source = MockPayloadSource::new();
        source.expect_fetch_payload().returning(|| {
            Err(DirectoryError::upstream(Some(503), "unavailable"))
        });

        let service = service(store, source);
        let snapshot = service.snapshot().await;

        assert!(snapshot.lookup("old").is_some());
    }

    #[tokio::test]
    async fn test_unparseable_payload_falls_back_to_stale_record() {
        let mut store = MockSnapshotStore::new();
        store.expect_read().returning(|| Ok(Some(stale_record())));

        let mut source = MockPayloadSource::new();
        source.expect_fetch_payload().returning(|| {
            Ok(DirectoryPayload {
                body: "<html>this is not a directory</html>".to_string(),
                content_hash: None,
            })
        });

        let service = service(store, source);
        let snapshot = service.snapshot().await;

        assert!(snapshot.lookup("old").is_some());
    }

    #[tokio::test]
    async fn test_fetch_failure_without_cache_serves_embedded() {
        let mut store = MockSnapshotStore::new();
        store.expect_read().returning(|| Ok(None));

        let mut source = MockPayloadSource::new();
        source
            .expect_fetch_payload()
            .returning(|| Err(DirectoryError::upstream(None, "connection refused")));

        let service = service(store, source);
        let snapshot = service.snapshot().await;

        assert!(!snapshot.is_empty());
        assert!(snapshot.lookup("g").is_some());
    }

    #[tokio::test]
    async fn test_corrupt_store_treated_as_miss() {
        let mut store = MockSnapshotStore::new();
        store
            .expect_read()
            .returning(|| Err(DirectoryError::StoreCorrupt("io failure".to_string())));
        store.expect_write().returning(|_| Ok(()));

        let mut source = MockPayloadSource::new();
        source.expect_fetch_payload().times(1).returning(|| {
            Ok(DirectoryPayload {
                body: BODY.to_string(),
                content_hash: None,
            })
        });

        let service = service(store, source);
        let snapshot = service.snapshot().await;

        assert!(snapshot.lookup("gh").is_some());
    }

    /// Payload source that counts calls and yields so waiters pile up.
    struct CountingSource {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PayloadSource for CountingSource {
        async fn fetch_payload(&self) -> Result<DirectoryPayload, DirectoryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            Ok(DirectoryPayload {
                body: BODY.to_string(),
                content_hash: None,
            })
        }
    }

    #[tokio::test]
    async fn test_concurrent_loads_share_one_fetch() {
        let mut store = MockSnapshotStore::new();
        store.expect_read().returning(|| Ok(None));
        store.expect_write().returning(|_| Ok(()));

        let source = Arc::new(CountingSource {
            calls: AtomicUsize::new(0),
        });
        let service = DirectoryService::new(Arc::new(store), source.clone(), ttl());

        let mut handles = Vec::new();
        for _ in 0..8 {
            let service = service.clone();
            handles.push(tokio::spawn(async move { service.snapshot().await }));
        }

        for handle in handles {
            let snapshot = handle.await.unwrap();
            assert!(snapshot.lookup("gh").is_some());
        }

        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_reload_bypasses_fresh_cache() {
        let mut store = MockSnapshotStore::new();
        store.expect_read().returning(|| Ok(Some(fresh_record())));
        store.expect_write().returning(|_| Ok(()));

        let mut source = MockPayloadSource::new();
        source.expect_fetch_payload().times(1).returning(|| {
            Ok(DirectoryPayload {
                body: BODY.to_string(),
                content_hash: None,
            })
        });

        let service = service(store, source);
        let snapshot = service.reload().await;

        assert!(snapshot.lookup("gh").is_some());
    }
}
