//! Cache Module
//!
//! Provides in-memory caching of upstream payloads with TTL expiration.

mod entry;
mod stats;
mod store;


// Re-export public types
pub use entry::{monotonic_ms, CacheEntry};
pub use stats::CacheStats;
pub use store::ResponseCache;

// == Public Constants ==
/// Ceiling applied to the TTL of transaction listings, in milliseconds
pub const TRANSACTIONS_TTL_CEILING_MS: u64 = 10_000;
