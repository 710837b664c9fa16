//! Configuration Module
//!
//! Handles loading and validating proxy configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

use crate::error::{ProxyError, Result};

/// Explorer API used when `EXPLORER_API_URL` is not set.
pub const DEFAULT_UPSTREAM_BASE: &str =
    "https://explorer-animechain-39xf6m45e3.t.conduit.xyz/api/v2";

/// Origins allowed when `ALLOWED_ORIGINS` is not set.
pub const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:3000,https://animechainexplorer.com";

/// Proxy configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Base URL of the explorer API, without trailing slash
    pub upstream_base: String,
    /// Origins that receive CORS headers
    pub allowed_origins: Vec<String>,
    /// Default cache TTL in milliseconds
    pub cache_ttl_ms: u64,
    /// Rate limit window length in milliseconds
    pub rate_limit_window_ms: u64,
    /// Requests allowed per client per window
    pub rate_limit_max: u32,
    /// Background sweep interval in seconds
    pub cleanup_interval: u64,
    /// Upstream request timeout in milliseconds
    pub upstream_timeout_ms: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `PORT` - HTTP server port (default: 3001)
    /// - `EXPLORER_API_URL` - Explorer API base URL
    /// - `ALLOWED_ORIGINS` - Comma-separated CORS allow-list
    /// - `CACHE_TTL` - Default cache TTL in ms (default: 30000)
    /// - `RATE_LIMIT_WINDOW_MS` - Rate limit window in ms (default: 60000)
    /// - `RATE_LIMIT_MAX` - Requests per window (default: 100)
    /// - `CLEANUP_INTERVAL` - Sweep frequency in seconds (default: 60)
    /// - `UPSTREAM_TIMEOUT_MS` - Upstream timeout in ms (default: 15000)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let allowed_origins = env::var("ALLOWED_ORIGINS")
            .map(|raw| parse_origins(&raw))
            .unwrap_or(defaults.allowed_origins);

        let upstream_base = env::var("EXPLORER_API_URL")
            .map(|raw| raw.trim().trim_end_matches('/').to_string())
            .unwrap_or(defaults.upstream_base);

        Self {
            server_port: env_or("PORT", defaults.server_port),
            upstream_base,
            allowed_origins,
            cache_ttl_ms: env_or("CACHE_TTL", defaults.cache_ttl_ms),
            rate_limit_window_ms: env_or("RATE_LIMIT_WINDOW_MS", defaults.rate_limit_window_ms),
            rate_limit_max: env_or("RATE_LIMIT_MAX", defaults.rate_limit_max),
            cleanup_interval: env_or("CLEANUP_INTERVAL", defaults.cleanup_interval),
            upstream_timeout_ms: env_or("UPSTREAM_TIMEOUT_MS", defaults.upstream_timeout_ms),
        }
    }

    /// Checks the configuration before the server starts.
    pub fn validate(self) -> Result<Self> {
        let base = Url::parse(&self.upstream_base).map_err(|err| {
            ProxyError::InvalidConfig(format!(
                "upstream base '{}' is not a valid URL: {}",
                self.upstream_base, err
            ))
        })?;

        if !matches!(base.scheme(), "http" | "https") {
            return Err(ProxyError::InvalidConfig(format!(
                "upstream base must use http or https, got '{}'",
                base.scheme()
            )));
        }

        let non_zero = [
            ("CACHE_TTL", self.cache_ttl_ms),
            ("RATE_LIMIT_WINDOW_MS", self.rate_limit_window_ms),
            ("RATE_LIMIT_MAX", u64::from(self.rate_limit_max)),
            ("CLEANUP_INTERVAL", self.cleanup_interval),
            ("UPSTREAM_TIMEOUT_MS", self.upstream_timeout_ms),
        ];
        if let Some((name, _)) = non_zero.iter().find(|(_, value)| *value == 0) {
            return Err(ProxyError::InvalidConfig(format!(
                "{} must be greater than zero",
                name
            )));
        }

        Ok(self)
    }

    /// Upstream timeout as a Duration.
    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_millis(self.upstream_timeout_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3001,
            upstream_base: DEFAULT_UPSTREAM_BASE.to_string(),
            allowed_origins: parse_origins(DEFAULT_ALLOWED_ORIGINS),
            cache_ttl_ms: 30_000,
            rate_limit_window_ms: 60_000,
            rate_limit_max: 100,
            cleanup_interval: 60,
            upstream_timeout_ms: 15_000,
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Splits a comma-separated origin list, dropping blanks.
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(|origin| origin.trim_end_matches('/').to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.server_port, 3001);
        assert_eq!(config.upstream_base, DEFAULT_UPSTREAM_BASE);
        assert_eq!(config.cache_ttl_ms, 30_000);
        assert_eq!(config.rate_limit_window_ms, 60_000);
        assert_eq!(config.rate_limit_max, 100);
        assert_eq!(config.cleanup_interval, 60);
        assert_eq!(
            config.allowed_origins,
            vec![
                "http://localhost:3000".to_string(),
                "https://animechainexplorer.com".to_string()
            ]
        );
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        for key in [
            "PORT",
            "EXPLORER_API_URL",
            "ALLOWED_ORIGINS",
            "CACHE_TTL",
            "RATE_LIMIT_WINDOW_MS",
            "RATE_LIMIT_MAX",
            "CLEANUP_INTERVAL",
            "UPSTREAM_TIMEOUT_MS",
        ] {
            env::remove_var(key);
        }

        let config = Config::from_env();
        assert_eq!(config.server_port, 3001);
        assert_eq!(config.cache_ttl_ms, 30_000);
        assert_eq!(config.upstream_timeout_ms, 15_000);
        assert_eq!(config.allowed_origins.len(), 2);
    }

    #[test]
    fn test_parse_origins_trims_and_skips_blanks() {
        let origins = parse_origins(" https://a.example , ,https://b.example/ ");
        assert_eq!(origins, vec!["https://a.example", "https://b.example"]);
    }

    #[test]
    fn test_validate_accepts_defaults() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_base() {
        let config = Config {
            upstream_base: "not a url".to_string(),
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ProxyError::InvalidConfig(_))
        ));

        let config = Config {
            upstream_base: "ftp://explorer.example".to_string(),
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ProxyError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_validate_rejects_zero_limits() {
        let config = Config {
            rate_limit_max: 0,
            ..Config::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("RATE_LIMIT_MAX"));
    }
}
