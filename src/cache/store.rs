//! Response Cache Module
//!
//! URL-keyed store for upstream payloads with per-entry TTL, lazy expiry on
//! lookup, and bulk expiry through `sweep`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::Value;
use tracing::debug;

use crate::cache::entry::monotonic_ms;
use crate::cache::{CacheEntry, CacheStats};

// == Response Cache ==
/// In-memory response cache keyed by request path plus canonical query.
#[derive(Debug)]
pub struct ResponseCache {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// Store and expiry counters
    stats: CacheStats,
    /// Hit and miss counters, updatable through a shared reference
    hits: AtomicU64,
    misses: AtomicU64,
    /// TTL in milliseconds applied to routes without a tighter policy
    default_ttl_ms: u64,
}

impl ResponseCache {
    // == Constructor ==
    pub fn new(default_ttl_ms: u64) -> Self {
        Self {
            entries: HashMap::new(),
            stats: CacheStats::new(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            default_ttl_ms,
        }
    }

    pub fn default_ttl_ms(&self) -> u64 {
        self.default_ttl_ms
    }

    // == Lookup ==
    /// Returns the payload under `key` if it is still fresh, counting a hit.
    ///
    /// Needs only a shared reference, so concurrent hits can run under a read
    /// lock. Misses are not counted here; follow up with [`lookup`] for that.
    ///
    /// [`lookup`]: ResponseCache::lookup
    pub fn get_fresh(&self, key: &str) -> Option<Value> {
        self.get_fresh_at(key, monotonic_ms())
    }

    pub fn get_fresh_at(&self, key: &str, now: u64) -> Option<Value> {
        let entry = self
            .entries
            .get(key)
            .filter(|entry| !entry.is_expired_at(now))?;

        self.hits.fetch_add(1, Ordering::Relaxed);
        debug!(key, "cache hit");
        Some(entry.payload.clone())
    }

    /// Returns the payload stored under `key` if it has not expired.
    ///
    /// An expired entry is removed on the spot and counted as a miss.
    pub fn lookup(&mut self, key: &str) -> Option<Value> {
        self.lookup_at(key, monotonic_ms())
    }

    pub fn lookup_at(&mut self, key: &str, now: u64) -> Option<Value> {
        if let Some(payload) = self.get_fresh_at(key, now) {
            return Some(payload);
        }

        if self.entries.remove(key).is_some() {
            self.stats.record_expirations(1);
            self.stats.set_total_entries(self.entries.len());
            debug!(key, "cache entry expired");
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        debug!(key, "cache miss");
        None
    }

    // == Store ==
    /// Stores a payload under `key`, replacing any previous entry.
    pub fn store(&mut self, key: String, payload: Value, ttl_ms: u64) {
        self.store_at(key, payload, ttl_ms, monotonic_ms());
    }

    pub fn store_at(&mut self, key: String, payload: Value, ttl_ms: u64, now: u64) {
        let entry = CacheEntry::new_at(key.clone(), payload, ttl_ms, now);
        self.entries.insert(key, entry);
        self.stats.record_store();
        self.stats.set_total_entries(self.entries.len());
    }

    // == Sweep ==
    /// Removes every expired entry and returns how many were removed.
    pub fn sweep(&mut self) -> usize {
        self.sweep_at(monotonic_ms())
    }

    pub fn sweep_at(&mut self, now: u64) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired_at(now));
        let removed = before - self.entries.len();

        self.stats.record_expirations(removed);
        self.stats.set_total_entries(self.entries.len());
        removed
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            total_entries: self.entries.len(),
            ..self.stats.clone()
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const T0: u64 = 1_700_000_000_000;

    #[test]
    fn test_cache_new() {
        let cache = ResponseCache::new(30_000);
        assert!(cache.is_empty());
        assert_eq!(cache.default_ttl_ms(), 30_000);
    }

    #[test]
    fn test_store_and_lookup() {
        let mut cache = ResponseCache::new(30_000);

        cache.store("/api/blockchain/stats".into(), json!({"total_blocks": "100"}), 30_000);

        assert_eq!(
            cache.lookup("/api/blockchain/stats"),
            Some(json!({"total_blocks": "100"}))
        );
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_lookup_missing_key() {
        let mut cache = ResponseCache::new(30_000);
        assert!(cache.lookup("/api/blockchain/blocks").is_none());
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn test_store_replaces_entry() {
        let mut cache = ResponseCache::new(30_000);

        cache.store_at("k".into(), json!(1), 1_000, T0);
        cache.store_at("k".into(), json!(2), 1_000, T0 + 900);

        // The refreshed entry gets a fresh lifetime
        assert_eq!(cache.lookup_at("k", T0 + 1_500), Some(json!(2)));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_expired_entry_is_removed_on_lookup() {
        let mut cache = ResponseCache::new(30_000);
        cache.store_at("k".into(), json!("v"), 10_000, T0);

        assert_eq!(cache.lookup_at("k", T0 + 9_999), Some(json!("v")));
        assert!(cache.lookup_at("k", T0 + 10_000).is_none());
        assert!(cache.is_empty());

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.expirations, 1);
    }

    #[test]
    fn test_get_fresh_through_shared_reference() {
        let mut cache = ResponseCache::new(30_000);
        cache.store_at("k".into(), json!("v"), 10_000, T0);

        let shared = &cache;
        assert_eq!(shared.get_fresh_at("k", T0 + 5_000), Some(json!("v")));
        assert_eq!(shared.get_fresh_at("k", T0 + 10_000), None);
        assert_eq!(shared.get_fresh_at("missing", T0), None);

        // Expired entries stay until a write-side lookup or sweep
        assert_eq!(cache.len(), 1);
        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 0);
    }

    #[test]
    fn test_query_strings_do_not_collide() {
        let mut cache = ResponseCache::new(30_000);
        cache.store_at("/api/blockchain/transactions?page=1".into(), json!({"page": 1}), 10_000, T0);
        cache.store_at("/api/blockchain/transactions?page=2".into(), json!({"page": 2}), 10_000, T0);

        assert_eq!(
            cache.lookup_at("/api/blockchain/transactions?page=1", T0),
            Some(json!({"page": 1}))
        );
        assert_eq!(
            cache.lookup_at("/api/blockchain/transactions?page=2", T0),
            Some(json!({"page": 2}))
        );
    }

    #[test]
    fn test_sweep_removes_only_expired() {
        let mut cache = ResponseCache::new(30_000);
        cache.store_at("short".into(), json!(1), 10_000, T0);
        cache.store_at("long".into(), json!(2), 30_000, T0);

        let removed = cache.sweep_at(T0 + 15_000);

        assert_eq!(removed, 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.lookup_at("long", T0 + 15_000), Some(json!(2)));
        assert_eq!(cache.stats().expirations, 1);
    }

    #[test]
    fn test_sweep_on_empty_cache() {
        let mut cache = ResponseCache::new(30_000);
        assert_eq!(cache.sweep(), 0);
    }

    #[test]
    fn test_stats_track_stores() {
        let mut cache = ResponseCache::new(30_000);
        cache.store("a".into(), json!(null), 30_000);
        cache.store("b".into(), json!(null), 30_000);
        cache.lookup("a");
        cache.lookup("c");

        let stats = cache.stats();
        assert_eq!(stats.stores, 2);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.total_entries, 2);
    }
}
