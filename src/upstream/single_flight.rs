//! In-flight request registry.
//!
//! Concurrent cache misses for the same key share one upstream call: the first
//! caller runs the fetch, later callers await the same cell and receive a
//! clone of its outcome.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use serde_json::Value;
use tokio::sync::OnceCell;

use crate::error::UpstreamFailure;

/// Outcome shared by every waiter on a key.
pub type FetchOutcome = Result<Value, UpstreamFailure>;

type Slot = Arc<OnceCell<FetchOutcome>>;

#[derive(Debug, Clone, Default)]
pub struct SingleFlight {
    pending: Arc<Mutex<HashMap<String, Slot>>>,
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `fetch` for `key` unless a call for the same key is already
    /// pending, in which case its result is awaited instead.
    ///
    /// Returns the outcome and whether this caller ran the fetch itself. If the
    /// running caller is cancelled, the next waiter takes over the fetch.
    pub async fn run<F, Fut>(&self, key: &str, fetch: F) -> (FetchOutcome, bool)
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = FetchOutcome>,
    {
        let slot = self.slot(key);

        let mut led = false;
        let outcome = slot
            .get_or_init(|| {
                led = true;
                fetch()
            })
            .await
            .clone();

        self.release(key, &slot);
        (outcome, led)
    }

    /// Number of keys with a pending fetch.
    pub fn pending(&self) -> usize {
        self.lock().len()
    }

    fn slot(&self, key: &str) -> Slot {
        self.lock()
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone()
    }

    /// Forgets a completed slot so the next miss starts a fresh fetch.
    fn release(&self, key: &str, slot: &Slot) {
        let mut pending = self.lock();
        if pending
            .get(key)
            .is_some_and(|current| Arc::ptr_eq(current, slot))
        {
            pending.remove(key);
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Slot>> {
        // The map is only touched in short non-panicking sections
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
