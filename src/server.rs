//! HTTP server initialization and runtime setup.
//!
//! Handles cache store setup, upstream client construction, refresh worker
//! spawning, and the Axum server lifecycle.

use crate::application::refresh_worker::run_refresh_worker;
use crate::application::services::{DirectoryService, EdgeProxyService};
use crate::config::Config;
use crate::domain::repositories::{EdgeStore, PayloadSource, SnapshotStore, UpstreamClient};
use crate::infrastructure::cache::{MemoryEdgeStore, RedisEdgeStore};
use crate::infrastructure::persistence::FileSnapshotStore;
use crate::infrastructure::upstream::HttpUpstreamClient;
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::Result;
use axum::ServiceExt;
use axum::extract::Request;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - Edge cache store (Redis, or in-memory fallback)
/// - Upstream HTTP client
/// - File-backed snapshot cache and directory loader
/// - Background refresh worker
/// - Axum HTTP server with graceful shutdown
///
/// # Errors
///
/// Returns an error if:
/// - The upstream client cannot be constructed
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let edge_store: Arc<dyn EdgeStore> = if let Some(redis_url) = &config.redis_url {
        match RedisEdgeStore::connect(redis_url).await {
            Ok(redis) => {
                tracing::info!("Edge cache enabled (Redis)");
                Arc::new(redis)
            }
            Err(e) => {
                tracing::warn!("Failed to connect to Redis: {}. Using in-memory edge cache.", e);
                Arc::new(MemoryEdgeStore::new())
            }
        }
    } else {
        tracing::info!("Edge cache in-memory (no REDIS_URL)");
        Arc::new(MemoryEdgeStore::new())
    };

    let upstream: Arc<dyn UpstreamClient> = Arc::new(HttpUpstreamClient::new(
        config.upstream_url.as_str(),
        Duration::from_secs(config.upstream_timeout_seconds),
    )?);

    let edge = Arc::new(EdgeProxyService::new(edge_store, upstream));

    let snapshot_store: Arc<dyn SnapshotStore> =
        Arc::new(FileSnapshotStore::new(&config.snapshot_path));
    let payload_source: Arc<dyn PayloadSource> = edge.clone();
    let directory = DirectoryService::new(
        snapshot_store,
        payload_source,
        chrono::Duration::seconds(config.directory_ttl_seconds as i64),
    );

    tokio::spawn(run_refresh_worker(
        edge.clone(),
        directory.clone(),
        Duration::from_secs(config.refresh_interval_seconds),
    ));
    tracing::info!(
        "Refresh worker started (period: {}s)",
        config.refresh_interval_seconds
    );

    let state = AppState::new(
        directory,
        edge,
        config.default_trigger.clone(),
        config.public_url.trim_end_matches('/').to_string(),
    );

    let app = app_router(state);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        tracing::error!("Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received");
}
