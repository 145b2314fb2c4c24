//! Per-operation admission gates whose latency grows with queueing.
//!
//! Every simulated operation passes through a [`DegradingGate`]. A caller
//! first takes a slot in the operation's bounded gate, then sleeps
//! `base_delay + degradation_factor * min(waiters, cap)` while still holding
//! the slot, where `waiters` is the number of callers queued behind it at
//! admission. Latency therefore rises linearly with load and flattens once
//! the queue is deeper than `cap`.

use std::time::Duration;

use tracing::trace;
use vidwarn_core::{ConcurrencyGate, GateError, GateStatus, OperationProfile, ServiceOperation};

use crate::metrics::SIMULATED_DELAY;

/// Latency added to one call that was admitted with `waiters` callers queued.
pub fn degradation_delay(profile: &OperationProfile, waiters: usize) -> Duration {
    let counted = waiters.min(profile.degradation_cap) as u32;
    profile.base_delay() + profile.degradation_factor() * counted
}

/// Admission gate for one simulated operation.
#[derive(Debug, Clone)]
pub struct DegradingGate {
    operation: ServiceOperation,
    profile: OperationProfile,
    gate: ConcurrencyGate,
}

impl DegradingGate {
    pub fn new(operation: ServiceOperation, profile: OperationProfile) -> Self {
        Self {
            operation,
            profile,
            gate: ConcurrencyGate::new(format!("simulator_{}", operation), profile.capacity),
        }
    }

    pub fn operation(&self) -> ServiceOperation {
        self.operation
    }

    pub fn profile(&self) -> &OperationProfile {
        &self.profile
    }

    /// Callers currently queued for a slot.
    pub fn waiters(&self) -> usize {
        self.gate.status().queued
    }

    pub fn status(&self) -> GateStatus {
        self.gate.status()
    }

    /// Waits for a slot, then holds it for the degraded delay.
    ///
    /// Returns the delay that was applied.
    pub async fn admit(&self) -> Result<Duration, GateError> {
        let _permit = self.gate.acquire().await?;
        let waiters = self.waiters();
        let delay = degradation_delay(&self.profile, waiters);

        SIMULATED_DELAY
            .with_label_values(&[self.operation.as_str()])
            .observe(delay.as_secs_f64());
        trace!(
            operation = %self.operation,
            waiters,
            delay_ms = delay.as_millis() as u64,
            "Simulating latency"
        );

        tokio::time::sleep(delay).await;
        Ok(delay)
    }
}
