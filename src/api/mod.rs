//! API Module
//!
//! HTTP handlers, middleware and routing for the explorer proxy.
//!
//! # Endpoints
//! - `GET /health` - Health check endpoint
//! - `GET /api/blockchain/stats` - Explorer stats
//! - `GET /api/blockchain/transactions` - Explorer transactions
//! - `GET /api/blockchain/blocks` - Explorer blocks
//! - `GET /api/blockchain/proxy` - Any explorer endpoint

pub mod handlers;
pub mod middleware;
pub mod routes;
mod state;

pub use handlers::*;
pub use routes::create_router;
pub use state::AppState;
