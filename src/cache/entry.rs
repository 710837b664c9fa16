//! Cache Entry Module
//!
//! Defines a cached upstream payload together with its TTL metadata.

use std::sync::OnceLock;
use std::time::Instant;

use serde_json::Value;

// == Cache Entry ==
/// A relayed upstream payload stored under its request key.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Request path plus canonical query string
    pub key: String,
    /// Upstream JSON body, relayed verbatim
    pub payload: Value,
    /// Store time on the monotonic clock, see [`monotonic_ms`]
    pub stored_at: u64,
    /// Lifetime in milliseconds
    pub ttl_ms: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new entry stamped with the current time.
    pub fn new(key: String, payload: Value, ttl_ms: u64) -> Self {
        Self::new_at(key, payload, ttl_ms, monotonic_ms())
    }

    /// Creates a new entry stamped with an explicit store time.
    pub fn new_at(key: String, payload: Value, ttl_ms: u64, stored_at: u64) -> Self {
        Self {
            key,
            payload,
            stored_at,
            ttl_ms,
        }
    }

    // == Age ==
    /// Milliseconds elapsed since the entry was stored.
    pub fn age_ms_at(&self, now: u64) -> u64 {
        now.saturating_sub(self.stored_at)
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now`.
    ///
    /// An entry is valid only while `now - stored_at < ttl_ms`; once the full
    /// TTL has elapsed it is expired.
    pub fn is_expired_at(&self, now: u64) -> bool {
        self.age_ms_at(now) >= self.ttl_ms
    }

    /// Checks if the entry has expired right now.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(monotonic_ms())
    }

    // == Time To Live ==
    /// Remaining lifetime in milliseconds, 0 once expired.
    pub fn ttl_remaining_ms_at(&self, now: u64) -> u64 {
        self.ttl_ms.saturating_sub(self.age_ms_at(now))
    }
}

// == Utility Functions ==
static CLOCK_ANCHOR: OnceLock<Instant> = OnceLock::new();

/// Milliseconds elapsed on a monotonic clock anchored at first use.
///
/// Only differences between readings are meaningful. Wall-clock adjustments
/// never move it backwards.
pub fn monotonic_ms() -> u64 {
    CLOCK_ANCHOR.get_or_init(Instant::now).elapsed().as_millis() as u64
}
