//! API Routes
//!
//! Configures the Axum router with all proxy endpoints and middleware.

use axum::{middleware, routing::get, Router};
use tower_http::trace::TraceLayer;

use super::handlers::{
    blocks_handler, health_handler, not_found_handler, proxy_handler, stats_handler,
    transactions_handler,
};
use super::middleware::{cors_gate, rate_limit};
use super::AppState;

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /health` - Liveness plus cache and rate limiter counters
/// - `GET /api/blockchain/stats` - Cached explorer stats
/// - `GET /api/blockchain/transactions` - Cached (short TTL) transaction list
/// - `GET /api/blockchain/blocks` - Cached block list
/// - `GET /api/blockchain/proxy?endpoint=...` - Cached generic explorer proxy
/// - anything else - 404 JSON error
///
/// # Middleware (outermost first)
/// - Tracing: Logs all requests
/// - CORS gate: allow-list headers, 204 for OPTIONS
/// - Rate limiter: fixed window per client IP
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/blockchain/stats", get(stats_handler))
        .route("/api/blockchain/transactions", get(transactions_handler))
        .route("/api/blockchain/blocks", get(blocks_handler))
        .route("/api/blockchain/proxy", get(proxy_handler))
        .fallback(not_found_handler)
        .layer(middleware::from_fn_with_state(state.clone(), rate_limit))
        .layer(middleware::from_fn_with_state(state.clone(), cors_gate))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::util::ServiceExt;

    fn create_test_app() -> Router {
        let config = Config {
            upstream_base: "http://127.0.0.1:9/api/v2".to_string(),
            ..Config::default()
        };
        create_router(AppState::from_config(&config).unwrap())
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let response = create_test_app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("ratelimit-limit"));
    }

    #[tokio::test]
    async fn test_unknown_path() {
        let response = create_test_app()
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_options_short_circuits() {
        let response = create_test_app()
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri("/api/blockchain/stats")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        // Preflights never reach the rate limiter
        assert!(!response.headers().contains_key("ratelimit-limit"));
    }

    #[tokio::test]
    async fn test_missing_endpoint() {
        let response = create_test_app()
            .oneshot(
                Request::builder()
                    .uri("/api/blockchain/proxy")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
