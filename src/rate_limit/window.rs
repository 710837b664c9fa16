//! Fixed window counter for a single client.

// == Rate Window ==
/// Request count for one client inside the current fixed window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateWindow {
    /// Requests seen since `window_start`, including rejected ones
    pub count: u32,
    /// Window start on the monotonic clock
    pub window_start: u64,
}

impl RateWindow {
    /// Opens a window at `now` that already counts the current request.
    pub fn open(now: u64) -> Self {
        Self {
            count: 1,
            window_start: now,
        }
    }

    /// True once `window_ms` has fully elapsed since the window opened.
    pub fn is_expired_at(&self, now: u64, window_ms: u64) -> bool {
        now.saturating_sub(self.window_start) >= window_ms
    }

    /// Milliseconds until the window resets.
    pub fn resets_in_ms(&self, now: u64, window_ms: u64) -> u64 {
        window_ms.saturating_sub(now.saturating_sub(self.window_start))
    }
}
