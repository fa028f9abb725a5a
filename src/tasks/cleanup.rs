//! Expiry Sweep Task
//!
//! Background task that periodically removes expired cache entries, so
//! tokens that are never looked up again do not hold memory until evicted.
//! Lookups already ignore expired entries; this only reclaims space.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::ResponseCache;

/// Spawns a background task that sweeps expired entries every `interval`.
///
/// The returned handle is used to abort the task during graceful shutdown.
///
/// # Example
/// ```ignore
/// let cache = Arc::new(ResponseCache::new(1000, Duration::from_secs(60)));
/// let cleanup_handle = spawn_cleanup_task(cache.clone(), Duration::from_secs(30));
/// // Later, during shutdown:
/// cleanup_handle.abort();
/// ```
pub fn spawn_cleanup_task(cache: Arc<ResponseCache>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(interval_secs = interval.as_secs_f64(), "Starting cache expiry sweeper");

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.cleanup_expired();
            let stats = cache.stats();

            if removed > 0 {
                info!(
                    removed,
                    entries = stats.total_entries,
                    hit_rate = stats.hit_rate(),
                    "Cache sweep removed expired entries"
                );
            } else {
                debug!(
                    entries = stats.total_entries,
                    hits = stats.hits,
                    misses = stats.misses,
                    evictions = stats.evictions,
                    "Cache sweep found no expired entries"
                );
            }
        }
    })
}
