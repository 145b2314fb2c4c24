//! Global cap on outbound connections.

use super::concurrency::{ConcurrencyGate, GatePermit};
use super::types::{GateError, GateStatus};

/// Bounds total simultaneous outbound calls to the remote service,
/// independent of how the per-resource gates are tuned.
///
/// Every outbound call holds one budget slot for its whole duration, in
/// addition to its resource gate (if any).
#[derive(Debug, Clone)]
pub struct ConnectionBudget {
    gate: ConcurrencyGate,
}

impl ConnectionBudget {
    pub const GATE_NAME: &'static str = "connections";

    pub fn new(capacity: usize) -> Self {
        Self {
            gate: ConcurrencyGate::new(Self::GATE_NAME, capacity),
        }
    }

    /// Waits for a connection slot.
    pub async fn acquire(&self) -> Result<GatePermit, GateError> {
        self.gate.acquire().await
    }

    pub fn capacity(&self) -> usize {
        self.gate.capacity()
    }

    pub fn close(&self) {
        self.gate.close();
    }

    pub fn status(&self) -> GateStatus {
        self.gate.status()
    }
}
