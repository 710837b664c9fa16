//! AnimeChain Proxy - caching CORS proxy for the AnimeChain explorer API
//!
//! Sits between browser clients and the explorer REST API, adding an origin
//! allow-list, per-IP rate limiting and a short-TTL response cache.

pub mod api;
pub mod cache;
pub mod config;
pub mod cors;
pub mod error;
pub mod models;
pub mod rate_limit;
pub mod tasks;
pub mod upstream;

pub use api::{create_router, AppState};
pub use config::Config;
pub use error::{ProxyError, UpstreamFailure};
pub use tasks::spawn_cleanup_task;
