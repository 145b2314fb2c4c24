//! Types for the gate module.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors returned when acquiring a gate.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GateError {
    /// The gate was closed while the caller was waiting.
    #[error("gate closed: {0}")]
    Closed(String),
}

/// Snapshot of a gate's counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateStatus {
    /// Gate name (e.g., "metadata", "transcript").
    pub name: String,
    /// Maximum concurrent holders.
    pub capacity: usize,
    /// Current holders.
    pub in_flight: usize,
    /// Callers waiting for a slot.
    pub queued: usize,
    /// Highest number of simultaneous holders observed.
    pub peak_in_flight: usize,
    /// Total successful acquisitions.
    pub total_admitted: u64,
    /// Total releases.
    pub total_released: u64,
}
