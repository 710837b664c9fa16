//! Shared application state
//!
//! One instance is built at startup and cloned into every handler and
//! middleware. All mutable maps sit behind Arc'd locks.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use crate::cache::ResponseCache;
use crate::config::Config;
use crate::cors::CorsPolicy;
use crate::error::Result;
use crate::models::{CacheStatus, QueryParams, RelayedResponse};
use crate::rate_limit::RateLimiter;
use crate::upstream::{SingleFlight, UpstreamClient, UpstreamRoute};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Upstream payload cache
    pub cache: Arc<RwLock<ResponseCache>>,
    /// Per-IP request counters
    pub limiter: Arc<Mutex<RateLimiter>>,
    pub cors: Arc<CorsPolicy>,
    pub upstream: UpstreamClient,
    /// Pending upstream fetches keyed by cache key
    pub flights: SingleFlight,
    pub config: Arc<Config>,
    started_at: Instant,
}

impl AppState {
    /// Creates the state described by `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let upstream = UpstreamClient::new(config.upstream_base.clone(), config.upstream_timeout())?;

        Ok(Self {
            cache: Arc::new(RwLock::new(ResponseCache::new(config.cache_ttl_ms))),
            limiter: Arc::new(Mutex::new(RateLimiter::new(
                config.rate_limit_window_ms,
                config.rate_limit_max,
            ))),
            cors: Arc::new(CorsPolicy::new(config.allowed_origins.clone())),
            upstream,
            flights: SingleFlight::new(),
            config: Arc::new(config.clone()),
            started_at: Instant::now(),
        })
    }

    /// Seconds since the state was built.
    pub fn uptime_secs(&self) -> f64 {
        self.started_at.elapsed().as_secs_f64()
    }

    // == Relay ==
    /// Answers from the cache, or fetches `route` upstream and caches the result.
    ///
    /// Concurrent misses on the same key share a single upstream call.
    /// Failures are returned to every waiter but never cached.
    pub async fn relay(
        &self,
        route: UpstreamRoute,
        cache_key: String,
        params: &QueryParams,
    ) -> Result<RelayedResponse> {
        // Fresh hits only need the read lock
        let fresh = self.cache.read().await.get_fresh(&cache_key);
        let cached = match fresh {
            Some(payload) => Some(payload),
            None => self.cache.write().await.lookup(&cache_key),
        };
        if let Some(payload) = cached {
            return Ok(RelayedResponse::new(payload, CacheStatus::Hit));
        }

        let ttl_ms = route.ttl_ms(self.config.cache_ttl_ms);

        let (outcome, led) = self
            .flights
            .run(&cache_key, || async {
                let payload = self.upstream.fetch(&route, params.pairs()).await?;
                self.cache
                    .write()
                    .await
                    .store(cache_key.clone(), payload.clone(), ttl_ms);
                Ok(payload)
            })
            .await;

        if !led {
            debug!(key = %cache_key, "joined in-flight upstream request");
        }

        Ok(RelayedResponse::new(outcome?, CacheStatus::Miss))
    }
}
