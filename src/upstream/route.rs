//! Mapping from proxy routes to explorer API paths.

use std::fmt;

use crate::cache::TRANSACTIONS_TTL_CEILING_MS;
use crate::error::{ProxyError, Result};

// == Upstream Route ==
/// Explorer API resource a proxy request resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpstreamRoute {
    Stats,
    Transactions,
    Blocks,
    /// Arbitrary explorer path taken from the `endpoint` query parameter
    Generic(String),
}

impl UpstreamRoute {
    /// Validates a caller-supplied `endpoint` for the generic proxy route.
    ///
    /// Rejects empty values and anything that could leave the configured base
    /// path or smuggle in its own query string.
    pub fn generic(endpoint: Option<&str>) -> Result<Self> {
        let endpoint = endpoint
            .map(|raw| raw.trim().trim_start_matches('/'))
            .filter(|trimmed| !trimmed.is_empty())
            .ok_or_else(|| {
                ProxyError::InvalidRequest("Missing required 'endpoint' query parameter".into())
            })?;

        let escapes_base = endpoint.split('/').any(is_dot_segment)
            || endpoint.contains("://")
            || endpoint.contains(['?', '#', '\\']);
        if escapes_base {
            return Err(ProxyError::InvalidRequest(format!(
                "Invalid 'endpoint' query parameter: {}",
                endpoint
            )));
        }

        Ok(UpstreamRoute::Generic(endpoint.to_string()))
    }

    /// Path appended to the upstream base URL.
    pub fn path(&self) -> &str {
        match self {
            UpstreamRoute::Stats => "stats",
            UpstreamRoute::Transactions => "transactions",
            UpstreamRoute::Blocks => "blocks",
            UpstreamRoute::Generic(endpoint) => endpoint,
        }
    }

    /// TTL for payloads from this route.
    ///
    /// Transaction listings change every block, so they never live longer
    /// than the transactions ceiling.
    pub fn ttl_ms(&self, default_ttl_ms: u64) -> u64 {
        match self {
            UpstreamRoute::Transactions => default_ttl_ms.min(TRANSACTIONS_TTL_CEILING_MS),
            _ => default_ttl_ms,
        }
    }

    /// Whether the client's query parameters are passed on to the explorer.
    pub fn forwards_query(&self) -> bool {
        !matches!(self, UpstreamRoute::Stats)
    }

    /// Error message used when the explorer call fails.
    pub fn failure_message(&self) -> String {
        match self {
            UpstreamRoute::Stats => "Failed to fetch blockchain stats".to_string(),
            UpstreamRoute::Transactions => "Failed to fetch transactions".to_string(),
            UpstreamRoute::Blocks => "Failed to fetch blocks".to_string(),
            UpstreamRoute::Generic(endpoint) => format!("Failed to proxy request to {}", endpoint),
        }
    }
}

/// `.` or `..`, including the percent-encoded spellings URL parsers resolve
/// the same way (`%2e`, `.%2E`, `%2e%2e`, ...).
fn is_dot_segment(segment: &str) -> bool {
    let lowered = segment.to_ascii_lowercase();
    let decoded = lowered.replace("%2e", ".");
    decoded == "." || decoded == ".."
}

impl fmt::Display for UpstreamRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_route_paths() {
        assert_eq!(UpstreamRoute::Stats.path(), "stats");
        assert_eq!(UpstreamRoute::Transactions.path(), "transactions");
        assert_eq!(UpstreamRoute::Blocks.path(), "blocks");
    }

    #[test]
    fn test_transactions_ttl_is_capped() {
        assert_eq!(UpstreamRoute::Transactions.ttl_ms(30_000), 10_000);
        assert_eq!(UpstreamRoute::Transactions.ttl_ms(5_000), 5_000);
        assert_eq!(UpstreamRoute::Blocks.ttl_ms(30_000), 30_000);
        assert_eq!(UpstreamRoute::Stats.ttl_ms(30_000), 30_000);
    }

    #[test]
    fn test_generic_requires_endpoint() {
        assert!(matches!(
            UpstreamRoute::generic(None),
            Err(ProxyError::InvalidRequest(_))
        ));
        assert!(matches!(
            UpstreamRoute::generic(Some("")),
            Err(ProxyError::InvalidRequest(_))
        ));
        assert!(matches!(
            UpstreamRoute::generic(Some("  /")),
            Err(ProxyError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_generic_strips_leading_slash() {
        let route = UpstreamRoute::generic(Some("/addresses/0xabc/transactions")).unwrap();
        assert_eq!(route.path(), "addresses/0xabc/transactions");
    }

    #[test]
    fn test_generic_rejects_traversal() {
        for endpoint in [
            "../admin",
            "tokens/../../secret",
            "http://evil.example/x",
            "stats?x=1",
            "stats#frag",
        ] {
            assert!(
                UpstreamRoute::generic(Some(endpoint)).is_err(),
                "{} should be rejected",
                endpoint
            );
        }
    }

    #[test]
    fn test_generic_rejects_encoded_dot_segments() {
        for endpoint in [
            "%2e%2e/%2e%2e/admin",
            "tokens/.%2e/secret",
            "%2E%2E/admin",
            "%2e./admin",
            "tokens/./holders",
            "tokens/%2e/holders",
        ] {
            assert!(
                matches!(
                    UpstreamRoute::generic(Some(endpoint)),
                    Err(ProxyError::InvalidRequest(_))
                ),
                "{} should be rejected",
                endpoint
            );
        }
    }

    #[test]
    fn test_dots_inside_segment_are_fine() {
        assert!(UpstreamRoute::generic(Some("tokens/v1..2")).is_ok());
        assert!(UpstreamRoute::generic(Some("tokens/%2e%2e2")).is_ok());
    }

    #[test]
    fn test_stats_does_not_forward_query() {
        assert!(!UpstreamRoute::Stats.forwards_query());
        assert!(UpstreamRoute::Blocks.forwards_query());
        assert!(UpstreamRoute::Generic("tokens".into()).forwards_query());
    }
}
