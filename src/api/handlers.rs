//! API Handlers
//!
//! HTTP request handlers for each proxy endpoint.

use axum::{
    extract::{Query, State},
    http::Uri,
    Json,
};

use crate::api::AppState;
use crate::error::{ProxyError, Result};
use crate::models::{
    CacheStatsResponse, HealthResponse, QueryParams, RateLimitStatsResponse, RelayedResponse,
    ENDPOINT_PARAM,
};
use crate::upstream::UpstreamRoute;

/// Query pairs in arrival order, duplicates preserved
type RawQuery = Query<Vec<(String, String)>>;

/// Handler for GET /api/blockchain/stats
pub async fn stats_handler(
    State(state): State<AppState>,
    uri: Uri,
    Query(pairs): RawQuery,
) -> Result<RelayedResponse> {
    relay_fixed(state, UpstreamRoute::Stats, &uri, pairs).await
}

/// Handler for GET /api/blockchain/transactions
///
/// Query parameters (pagination, filters) are forwarded as-is.
pub async fn transactions_handler(
    State(state): State<AppState>,
    uri: Uri,
    Query(pairs): RawQuery,
) -> Result<RelayedResponse> {
    relay_fixed(state, UpstreamRoute::Transactions, &uri, pairs).await
}

/// Handler for GET /api/blockchain/blocks
pub async fn blocks_handler(
    State(state): State<AppState>,
    uri: Uri,
    Query(pairs): RawQuery,
) -> Result<RelayedResponse> {
    relay_fixed(state, UpstreamRoute::Blocks, &uri, pairs).await
}

/// Handler for GET /api/blockchain/proxy
///
/// Forwards to `{base}/{endpoint}`. The `endpoint` parameter is part of the
/// cache key but is stripped before forwarding. A missing endpoint is rejected
/// before the cache or upstream is touched.
pub async fn proxy_handler(
    State(state): State<AppState>,
    uri: Uri,
    Query(pairs): RawQuery,
) -> Result<RelayedResponse> {
    let mut params = QueryParams::from(pairs);
    let cache_key = params.cache_key(uri.path());

    let endpoint = params.take(ENDPOINT_PARAM);
    let route = UpstreamRoute::generic(endpoint.as_deref())?;

    state.relay(route, cache_key, &params).await
}

async fn relay_fixed(
    state: AppState,
    route: UpstreamRoute,
    uri: &Uri,
    pairs: Vec<(String, String)>,
) -> Result<RelayedResponse> {
    let params = QueryParams::from(pairs);
    let cache_key = params.cache_key(uri.path());
    state.relay(route, cache_key, &params).await
}

/// Handler for GET /health
///
/// Reports liveness plus cache and rate limiter counters.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let cache = {
        let cache = state.cache.read().await;
        CacheStatsResponse::new(&cache.stats(), cache.default_ttl_ms())
    };

    let rate_limit = RateLimitStatsResponse {
        tracked_clients: state.limiter.lock().await.tracked_clients(),
        max_requests: state.config.rate_limit_max,
        window_ms: state.config.rate_limit_window_ms,
    };

    Json(HealthResponse::ok(state.uptime_secs(), cache, rate_limit))
}

/// Fallback for unknown paths
pub async fn not_found_handler() -> ProxyError {
    ProxyError::NotFound
}
