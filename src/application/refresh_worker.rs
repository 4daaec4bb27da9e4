//! Background job keeping the edge cache warm.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::application::services::{DirectoryService, EdgeProxyService, RefreshOutcome};

/// Runs the periodic directory refresh until the process shuts down.
///
/// Each tick performs a hash-gated refresh of the edge cache; when content
/// actually changed, the directory is reloaded through the single-flight
/// gate so the resolver picks up the new entries without waiting for its
/// own TTL to lapse. The first tick fires immediately to warm the cache at
/// startup. A failed pass is logged and the previous cache entry stays
/// authoritative.
pub async fn run_refresh_worker(
    edge: Arc<EdgeProxyService>,
    directory: DirectoryService,
    period: Duration,
) {
    let mut ticker = time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        match edge.refresh().await {
            Ok(RefreshOutcome::Updated) => {
                info!("Scheduled refresh: directory content changed");
                directory.reload().await;
            }
            Ok(RefreshOutcome::Unchanged) => {
                debug!("Scheduled refresh: directory content unchanged");
            }
            Err(e) => {
                warn!("Scheduled refresh failed, keeping cached directory: {}", e);
            }
        }
    }
}
