use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::engine::Engine;
use crate::model::FilterSpec;

/// Background task that reloads the cache on a fixed interval and logs the
/// dashboard stats for `spec`. A failed reload keeps the previous snapshot;
/// the next tick is the retry.
pub async fn run_refresher(engine: Arc<Engine>, every: Duration, spec: FilterSpec) {
    let mut interval = tokio::time::interval(every);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    // The first tick fires immediately; the caller has just loaded.
    interval.tick().await;
    loop {
        interval.tick().await;
        if engine.is_loading() {
            continue;
        }
        match engine.load().await {
            Ok(_) => match engine.query(&spec) {
                Ok(result) => info!(
                    "refreshed: {} bookings, {} confirmed, {} pending, revenue {:.2}; {} match",
                    result.stats.total,
                    result.stats.confirmed,
                    result.stats.pending,
                    result.stats.total_revenue,
                    result.pagination.total,
                ),
                Err(e) => warn!("refresh query failed: {e}"),
            },
            Err(e) => warn!("refresh failed, keeping previous snapshot: {e}"),
        }
    }
}
