//! Sweep Task
//!
//! Background task that periodically removes expired cache entries and
//! expired rate limit windows.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::ResponseCache;
use crate::rate_limit::RateLimiter;

/// Spawns a background task that sweeps the cache and the rate limiter.
///
/// The task runs in an infinite loop, sleeping for the specified interval
/// between runs. Each lock is held only for the duration of its own sweep.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let handle = spawn_cleanup_task(state.cache.clone(), state.limiter.clone(), 60);
/// // Later, during shutdown:
/// handle.abort();
/// ```
pub fn spawn_cleanup_task(
    cache: Arc<RwLock<ResponseCache>>,
    limiter: Arc<Mutex<RateLimiter>>,
    cleanup_interval_secs: u64,
) -> JoinHandle<()> {
    let interval = Duration::from_secs(cleanup_interval_secs);

    tokio::spawn(async move {
        info!(
            "Starting sweep task with interval of {} seconds",
            cleanup_interval_secs
        );

        loop {
            tokio::time::sleep(interval).await;

            let (removed, remaining) = {
                let mut cache_guard = cache.write().await;
                let removed = cache_guard.sweep();
                (removed, cache_guard.len())
            };
            let idle_clients = limiter.lock().await.sweep_idle();

            if removed > 0 {
                info!(
                    "Cache sweep: removed {} expired entries, {} remaining",
                    removed, remaining
                );
            } else {
                debug!("Cache sweep: no expired entries found");
            }

            if idle_clients > 0 {
                debug!("Rate limit sweep: dropped {} idle client windows", idle_clients);
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn shared(ttl_ms: u64, window_ms: u64) -> (Arc<RwLock<ResponseCache>>, Arc<Mutex<RateLimiter>>) {
        (
            Arc::new(RwLock::new(ResponseCache::new(ttl_ms))),
            Arc::new(Mutex::new(RateLimiter::new(window_ms, 100))),
        )
    }

    #[tokio::test]
    async fn test_sweep_task_removes_expired_entries() {
        let (cache, limiter) = shared(30_000, 60_000);

        cache
            .write()
            .await
            .store("expire_soon".to_string(), json!("value"), 200);

        let handle = spawn_cleanup_task(cache.clone(), limiter, 1);

        // Wait for entry to expire and the sweep to run
        tokio::time::sleep(Duration::from_millis(1500)).await;

        // Verify the sweep removed it without any lookup
        assert!(cache.read().await.is_empty(), "Expired entry should have been swept");
        assert_eq!(cache.read().await.stats().expirations, 1);

        handle.abort();
    }

    #[tokio::test]
    async fn test_sweep_task_preserves_valid_entries() {
        let (cache, limiter) = shared(30_000, 60_000);

        cache
            .write()
            .await
            .store("long_lived".to_string(), json!("value"), 3_600_000);

        let handle = spawn_cleanup_task(cache.clone(), limiter, 1);

        tokio::time::sleep(Duration::from_millis(1500)).await;

        let mut cache_guard = cache.write().await;
        assert_eq!(cache_guard.lookup("long_lived"), Some(json!("value")));

        handle.abort();
    }

    #[tokio::test]
    async fn test_sweep_task_drops_idle_windows() {
        let (cache, limiter) = shared(30_000, 200);

        limiter.lock().await.check("10.0.0.1");

        let handle = spawn_cleanup_task(cache, limiter.clone(), 1);

        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert_eq!(limiter.lock().await.tracked_clients(), 0);

        handle.abort();
    }

    #[tokio::test]
    async fn test_sweep_task_can_be_aborted() {
        let (cache, limiter) = shared(30_000, 60_000);

        let handle = spawn_cleanup_task(cache, limiter, 1);
        handle.abort();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
