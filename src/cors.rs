//! CORS Gate
//!
//! Static origin allow-list. Allowed origins get the CORS response headers;
//! anything else is served without them and left for the browser to block.

use axum::http::{
    header::{
        ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
        ACCESS_CONTROL_MAX_AGE, VARY,
    },
    HeaderMap, HeaderValue,
};

const ALLOW_METHODS: &str = "GET, POST, OPTIONS";
const ALLOW_HEADERS: &str = "Content-Type, Authorization";
/// Preflight cache duration, 24 hours
const MAX_AGE_SECS: &str = "86400";

// == CORS Policy ==
#[derive(Debug, Clone, Default)]
pub struct CorsPolicy {
    allowed_origins: Vec<String>,
}

impl CorsPolicy {
    pub fn new(allowed_origins: Vec<String>) -> Self {
        Self { allowed_origins }
    }

    /// Exact, case-sensitive match against the allow-list.
    pub fn allows(&self, origin: &str) -> bool {
        self.allowed_origins.iter().any(|allowed| allowed == origin)
    }

    /// Returns the origin to echo back, if the request declared an allowed one.
    pub fn evaluate(&self, origin: Option<&HeaderValue>) -> Option<HeaderValue> {
        let origin = origin?;
        let value = origin.to_str().ok()?;
        self.allows(value).then(|| origin.clone())
    }

    /// Writes the CORS headers for an allowed origin.
    pub fn apply(&self, headers: &mut HeaderMap, origin: HeaderValue) {
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin);
        headers.insert(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOW_METHODS),
        );
        headers.insert(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOW_HEADERS),
        );
        headers.insert(ACCESS_CONTROL_MAX_AGE, HeaderValue::from_static(MAX_AGE_SECS));
    }

    /// Marks a response as varying by `Origin`, whether or not the origin was
    /// allowed.
    pub fn vary_on_origin(headers: &mut HeaderMap) {
        headers.append(VARY, HeaderValue::from_static("Origin"));
    }
}
