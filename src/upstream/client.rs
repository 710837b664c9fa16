//! HTTP client for the explorer API.

use std::time::Duration;

use reqwest::{header::ACCEPT, Client, StatusCode};
use serde_json::{json, Value};
use tracing::{debug, warn};
use url::Url;

use crate::error::{ProxyError, UpstreamFailure};
use crate::upstream::UpstreamRoute;

// == Upstream Client ==
/// Issues GET requests against the configured explorer base URL.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: Client,
    base: String,
    /// Path prefix every upstream URL must stay under, with trailing `/`
    base_path: String,
}

impl UpstreamClient {
    /// Builds a client with a bounded per-request timeout.
    pub fn new(base: impl Into<String>, timeout: Duration) -> Result<Self, ProxyError> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| ProxyError::Internal(format!("failed to build HTTP client: {}", err)))?;

        let base = base.into().trim_end_matches('/').to_string();
        let base_path = Url::parse(&base)
            .map(|url| format!("{}/", url.path().trim_end_matches('/')))
            .map_err(|err| {
                ProxyError::InvalidConfig(format!("invalid upstream base '{}': {}", base, err))
            })?;

        Ok(Self {
            http,
            base,
            base_path,
        })
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    // == URL Construction ==
    /// Joins the base URL, the route path, and the forwarded query pairs.
    ///
    /// The resolved path must stay under the base path; anything that
    /// normalizes outside of it is refused with a 400.
    pub fn url_for(&self, route: &UpstreamRoute, params: &[(String, String)]) -> Result<Url, UpstreamFailure> {
        let raw = format!("{}/{}", self.base, route.path());
        let mut url = Url::parse(&raw).map_err(|err| UpstreamFailure {
            status: None,
            message: route.failure_message(),
            details: json!(format!("invalid upstream URL '{}': {}", raw, err)),
        })?;

        if !url.path().starts_with(&self.base_path) {
            warn!(%url, base = %self.base, "upstream path escapes the base path");
            return Err(UpstreamFailure {
                status: Some(StatusCode::BAD_REQUEST.as_u16()),
                message: route.failure_message(),
                details: json!("endpoint resolves outside the explorer API"),
            });
        }

        if route.forwards_query() && !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }

        Ok(url)
    }

    // == Fetch ==
    /// Fetches a route and decodes its JSON body.
    ///
    /// Non-2xx answers keep the upstream status and body; transport errors,
    /// timeouts and undecodable bodies carry no status.
    pub async fn fetch(
        &self,
        route: &UpstreamRoute,
        params: &[(String, String)],
    ) -> Result<Value, UpstreamFailure> {
        let url = self.url_for(route, params)?;
        debug!(%url, "forwarding to explorer API");

        let response = self
            .http
            .get(url.clone())
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|err| transport_failure(route, &err))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| transport_failure(route, &err))?;

        if !status.is_success() {
            warn!(%url, %status, "explorer API returned an error status");
            return Err(status_failure(route, status, &body));
        }

        serde_json::from_slice(&body).map_err(|err| {
            warn!(%url, %err, "explorer API returned a non-JSON body");
            UpstreamFailure {
                status: None,
                message: route.failure_message(),
                details: json!(format!("invalid JSON from upstream: {}", err)),
            }
        })
    }
}

fn transport_failure(route: &UpstreamRoute, err: &reqwest::Error) -> UpstreamFailure {
    let details = if err.is_timeout() {
        "upstream request timed out".to_string()
    } else {
        err.to_string()
    };
    warn!(route = %route, error = %err, "explorer API request failed");

    UpstreamFailure {
        status: None,
        message: route.failure_message(),
        details: json!(details),
    }
}

fn status_failure(route: &UpstreamRoute, status: StatusCode, body: &[u8]) -> UpstreamFailure {
    // Relay the upstream body as-is when it is JSON, otherwise as text
    let details = serde_json::from_slice::<Value>(body)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(body).into_owned()));

    UpstreamFailure {
        status: Some(status.as_u16()),
        message: format!(
            "{}: upstream responded with {}",
            route.failure_message(),
            status
        ),
        details,
    }
}
