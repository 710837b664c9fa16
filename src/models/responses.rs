//! Response DTOs for the proxy API
//!
//! Defines the structure of outgoing HTTP response bodies.

use axum::{
    http::{HeaderName, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;

use crate::cache::CacheStats;

/// Header reporting whether a payload came from the cache
pub const X_CACHE: HeaderName = HeaderName::from_static("x-cache");

/// Where a relayed payload came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
}

impl CacheStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "HIT",
            CacheStatus::Miss => "MISS",
        }
    }
}

/// Upstream JSON payload relayed to the client with status 200.
#[derive(Debug, Clone)]
pub struct RelayedResponse {
    pub payload: Value,
    pub cache: CacheStatus,
}

impl RelayedResponse {
    pub fn new(payload: Value, cache: CacheStatus) -> Self {
        Self { payload, cache }
    }
}

impl IntoResponse for RelayedResponse {
    fn into_response(self) -> Response {
        (
            [(X_CACHE, HeaderValue::from_static(self.cache.as_str()))],
            Json(self.payload),
        )
            .into_response()
    }
}

/// Cache section of the health report
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatsResponse {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub stores: u64,
    pub expirations: u64,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
    pub default_ttl_ms: u64,
}

impl CacheStatsResponse {
    pub fn new(stats: &CacheStats, default_ttl_ms: u64) -> Self {
        Self {
            entries: stats.total_entries,
            hits: stats.hits,
            misses: stats.misses,
            stores: stats.stores,
            expirations: stats.expirations,
            hit_rate: stats.hit_rate(),
            default_ttl_ms,
        }
    }
}

/// Rate limiter section of the health report
#[derive(Debug, Clone, Serialize)]
pub struct RateLimitStatsResponse {
    pub tracked_clients: usize,
    pub max_requests: u32,
    pub window_ms: u64,
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Always "ok" while the process is serving
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
    /// Seconds since the server started
    pub uptime: f64,
    pub cache: CacheStatsResponse,
    pub rate_limit: RateLimitStatsResponse,
}

impl HealthResponse {
    pub fn ok(uptime: f64, cache: CacheStatsResponse, rate_limit: RateLimitStatsResponse) -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            uptime,
            cache,
            rate_limit,
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}
