//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Sweep: removes expired cache entries and idle rate limit windows

mod cleanup;

pub use cleanup::spawn_cleanup_task;
