//! Error types for the proxy server
//!
//! Provides unified error handling using thiserror. Every variant renders as a
//! JSON envelope of the form `{ "error": ..., "details": ... }`.

use axum::{
    http::{header::RETRY_AFTER, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use thiserror::Error;

use crate::models::ErrorResponse;

// == Upstream Failure ==
/// A failed call to the explorer API.
///
/// Cloneable so that every request waiting on the same in-flight fetch can
/// receive its own copy of the outcome.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct UpstreamFailure {
    /// Status returned by the upstream, None for transport or decode failures
    pub status: Option<u16>,
    /// Human readable summary
    pub message: String,
    /// Upstream body or transport error detail
    pub details: Value,
}

impl UpstreamFailure {
    /// Status code to relay to the client.
    ///
    /// Falls back to 500 when the upstream never answered or answered with
    /// something that is not a valid error status.
    pub fn status_code(&self) -> StatusCode {
        self.status
            .and_then(|code| StatusCode::from_u16(code).ok())
            .filter(|code| code.is_client_error() || code.is_server_error())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

// == Proxy Error Enum ==
/// Unified error type for the proxy server.
#[derive(Error, Debug)]
pub enum ProxyError {
    /// No route matched the request path
    #[error("Not found")]
    NotFound,

    /// Missing or malformed client input
    #[error("{0}")]
    InvalidRequest(String),

    /// Client exceeded its request budget for the current window
    #[error("Too many requests from this IP, please try again after {retry_after_secs} seconds")]
    RateLimited { retry_after_secs: u64 },

    /// Explorer API call failed
    #[error(transparent)]
    Upstream(#[from] UpstreamFailure),

    /// Rejected configuration at startup
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ProxyError {
    /// HTTP status used when rendering this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::NotFound => StatusCode::NOT_FOUND,
            ProxyError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ProxyError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ProxyError::Upstream(failure) => failure.status_code(),
            ProxyError::InvalidConfig(_) | ProxyError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match &self {
            ProxyError::Upstream(failure) => {
                ErrorResponse::new(failure.message.clone()).with_details(failure.details.clone())
            }
            other => ErrorResponse::new(other.to_string()),
        };

        let mut response = (status, Json(body)).into_response();

        if let ProxyError::RateLimited { retry_after_secs } = self {
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(retry_after_secs));
        }

        response
    }
}

// == Result Type Alias ==
/// Convenience Result type for the proxy server.
pub type Result<T> = std::result::Result<T, ProxyError>;
