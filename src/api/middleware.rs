//! Request middleware
//!
//! Runs in order: CORS gate, then rate limiter, then the route handler.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header::ORIGIN, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, warn};

use crate::api::AppState;
use crate::cors::CorsPolicy;
use crate::error::ProxyError;

/// Client identifier used when the transport exposes no peer address
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Adds CORS headers for allow-listed origins and answers every OPTIONS
/// request with 204.
///
/// Disallowed origins are still served, just without CORS headers. Every
/// response carries `Vary: Origin`.
pub async fn cors_gate(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let origin = req.headers().get(ORIGIN).cloned();
    let allowed = state.cors.evaluate(origin.as_ref());

    if allowed.is_none() {
        if let Some(origin) = &origin {
            debug!(?origin, "origin not in CORS allow-list");
        }
    }

    let mut response = if req.method() == Method::OPTIONS {
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(req).await
    };

    if let Some(origin) = allowed {
        state.cors.apply(response.headers_mut(), origin);
    }
    CorsPolicy::vary_on_origin(response.headers_mut());

    response
}

/// Counts the request against the caller's window and rejects it with 429
/// once the window's budget is spent.
pub async fn rate_limit(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let client = client_id(&req);
    let decision = state.limiter.lock().await.check(&client);

    if !decision.allowed {
        warn!(%client, "rate limit exceeded");
        let mut response = ProxyError::RateLimited {
            retry_after_secs: decision.retry_after_secs(),
        }
        .into_response();
        decision.apply_headers(response.headers_mut());
        return response;
    }

    let mut response = next.run(req).await;
    decision.apply_headers(response.headers_mut());
    response
}

/// Peer IP of the connection, or [`UNKNOWN_CLIENT`].
pub fn client_id(req: &Request) -> String {
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}
