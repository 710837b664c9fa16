//! Rate Limit Module
//!
//! Fixed-window request counting per client IP.

mod limiter;
mod window;

pub use limiter::{RateDecision, RateLimiter};
pub use window::RateWindow;
