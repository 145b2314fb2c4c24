//! Remote video service simulator.
//!
//! An axum service exposing list, metadata, transcript and write-back
//! operations over an in-memory catalog, with per-operation admission gates
//! whose latency degrades as callers queue.

pub mod api;
pub mod degradation;
pub mod metrics;
pub mod state;

pub use api::create_router;
pub use degradation::{degradation_delay, DegradingGate};
pub use state::AppState;
