//! Request and Response models for the proxy API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! parsing query strings and serializing HTTP response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{QueryParams, ENDPOINT_PARAM};
pub use responses::{
    CacheStatsResponse, CacheStatus, ErrorResponse, HealthResponse, RateLimitStatsResponse,
    RelayedResponse, X_CACHE,
};
