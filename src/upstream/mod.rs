//! Upstream Module
//!
//! Forwards proxy requests to the AnimeChain explorer API.
//!
//! # Components
//! - `UpstreamRoute`: proxy route to explorer path and TTL policy
//! - `UpstreamClient`: reqwest-based GET with timeout and error envelopes
//! - `SingleFlight`: shares one upstream call between concurrent misses

mod client;
mod route;
mod single_flight;

pub use client::UpstreamClient;
pub use route::UpstreamRoute;
pub use single_flight::{FetchOutcome, SingleFlight};
