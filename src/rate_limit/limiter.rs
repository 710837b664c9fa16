//! Per-client fixed window rate limiter.

use std::collections::HashMap;

use axum::http::{HeaderMap, HeaderName, HeaderValue};

use crate::cache::monotonic_ms;
use crate::rate_limit::RateWindow;

const RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("ratelimit-limit");
const RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("ratelimit-remaining");
const RATELIMIT_RESET: HeaderName = HeaderName::from_static("ratelimit-reset");

// == Decision ==
/// Outcome of counting one request against a client's window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    pub allowed: bool,
    /// Configured maximum per window
    pub limit: u32,
    /// Requests left in the current window
    pub remaining: u32,
    /// Milliseconds until the window resets
    pub reset_after_ms: u64,
}

impl RateDecision {
    /// Seconds until reset, rounded up so clients never retry early.
    pub fn retry_after_secs(&self) -> u64 {
        self.reset_after_ms.div_ceil(1000)
    }

    /// Writes the `RateLimit-*` headers onto a response.
    pub fn apply_headers(&self, headers: &mut HeaderMap) {
        headers.insert(RATELIMIT_LIMIT, HeaderValue::from(self.limit));
        headers.insert(RATELIMIT_REMAINING, HeaderValue::from(self.remaining));
        headers.insert(
            RATELIMIT_RESET,
            HeaderValue::from(self.retry_after_secs()),
        );
    }
}

// == Rate Limiter ==
/// Counts requests per client identifier over fixed, non-overlapping windows.
#[derive(Debug)]
pub struct RateLimiter {
    windows: HashMap<String, RateWindow>,
    window_ms: u64,
    max_requests: u32,
}

impl RateLimiter {
    pub fn new(window_ms: u64, max_requests: u32) -> Self {
        Self {
            windows: HashMap::new(),
            window_ms,
            max_requests,
        }
    }

    // == Check ==
    /// Counts a request from `client` and decides whether it may proceed.
    pub fn check(&mut self, client: &str) -> RateDecision {
        self.check_at(client, monotonic_ms())
    }

    pub fn check_at(&mut self, client: &str, now: u64) -> RateDecision {
        let window_ms = self.window_ms;

        let window = match self.windows.get_mut(client) {
            Some(window) if !window.is_expired_at(now, window_ms) => {
                window.count = window.count.saturating_add(1);
                *window
            }
            Some(window) => {
                *window = RateWindow::open(now);
                *window
            }
            None => {
                let window = RateWindow::open(now);
                self.windows.insert(client.to_string(), window);
                window
            }
        };

        RateDecision {
            allowed: window.count <= self.max_requests,
            limit: self.max_requests,
            remaining: self.max_requests.saturating_sub(window.count),
            reset_after_ms: window.resets_in_ms(now, window_ms),
        }
    }

    // == Sweep ==
    /// Drops windows that have already expired.
    ///
    /// An expired window behaves exactly like a missing one on the next
    /// request, so removing it only reclaims memory.
    pub fn sweep_idle(&mut self) -> usize {
        self.sweep_idle_at(monotonic_ms())
    }

    pub fn sweep_idle_at(&mut self, now: u64) -> usize {
        let window_ms = self.window_ms;
        let before = self.windows.len();
        self.windows
            .retain(|_, window| !window.is_expired_at(now, window_ms));
        before - self.windows.len()
    }

    /// Number of clients with a tracked window.
    pub fn tracked_clients(&self) -> usize {
        self.windows.len()
    }

    /// Current count for `client`, if a window is tracked.
    pub fn count_for(&self, client: &str) -> Option<u32> {
        self.windows.get(client).map(|window| window.count)
    }
}
