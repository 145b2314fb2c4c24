//! Named, capacity-bounded admission gate.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::trace;

use crate::metrics::{GATE_IN_FLIGHT, GATE_WAIT_SECONDS};

use super::types::{GateError, GateStatus};

/// Counters for a single gate.
#[derive(Debug, Default)]
struct GateStats {
    in_flight: AtomicUsize,
    queued: AtomicUsize,
    peak: AtomicUsize,
    admitted: AtomicU64,
    released: AtomicU64,
}

/// Keeps `queued` accurate even if the acquiring future is dropped.
struct QueuedGuard<'a>(&'a AtomicUsize);

impl<'a> QueuedGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for QueuedGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// A bounded-concurrency gate with FIFO admission.
///
/// At most `capacity` callers hold a [`GatePermit`] at any time. Waiters are
/// admitted in the order they started waiting (tokio's `Semaphore` is fair).
/// Cloning is cheap and clones share the same slots.
#[derive(Debug, Clone)]
pub struct ConcurrencyGate {
    name: Arc<str>,
    capacity: usize,
    semaphore: Arc<Semaphore>,
    stats: Arc<GateStats>,
}

impl ConcurrencyGate {
    /// Creates a gate. A capacity of zero is raised to one.
    pub fn new(name: impl Into<String>, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let name: String = name.into();
        Self {
            name: Arc::from(name),
            capacity,
            semaphore: Arc::new(Semaphore::new(capacity)),
            stats: Arc::new(GateStats::default()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Waits for a free slot.
    ///
    /// Suspends only the calling task. The slot is released when the
    /// returned permit is dropped, on every exit path.
    pub async fn acquire(&self) -> Result<GatePermit, GateError> {
        let started = Instant::now();
        let queued = QueuedGuard::enter(&self.stats.queued);

        let permit = Arc::clone(&self.semaphore)
            .acquire_owned()
            .await
            .map_err(|_| GateError::Closed(self.name.to_string()))?;
        drop(queued);

        let in_flight = self.stats.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.stats.peak.fetch_max(in_flight, Ordering::SeqCst);
        self.stats.admitted.fetch_add(1, Ordering::Relaxed);

        let waited = started.elapsed();
        GATE_WAIT_SECONDS
            .with_label_values(&[&*self.name])
            .observe(waited.as_secs_f64());
        GATE_IN_FLIGHT.with_label_values(&[&*self.name]).inc();
        trace!(
            gate = %self.name,
            in_flight,
            waited_ms = waited.as_millis() as u64,
            "Gate admitted"
        );

        Ok(GatePermit {
            name: Arc::clone(&self.name),
            stats: Arc::clone(&self.stats),
            _permit: permit,
        })
    }

    /// Closes the gate. Current and future waiters get [`GateError::Closed`];
    /// permits already held stay valid until dropped.
    pub fn close(&self) {
        self.semaphore.close();
    }

    pub fn is_closed(&self) -> bool {
        self.semaphore.is_closed()
    }

    /// Returns a snapshot of the gate's counters.
    pub fn status(&self) -> GateStatus {
        GateStatus {
            name: self.name.to_string(),
            capacity: self.capacity,
            in_flight: self.stats.in_flight.load(Ordering::SeqCst),
            queued: self.stats.queued.load(Ordering::SeqCst),
            peak_in_flight: self.stats.peak.load(Ordering::SeqCst),
            total_admitted: self.stats.admitted.load(Ordering::Relaxed),
            total_released: self.stats.released.load(Ordering::Relaxed),
        }
    }
}

/// A held slot in a [`ConcurrencyGate`]. Dropping it releases the slot.
#[derive(Debug)]
pub struct GatePermit {
    name: Arc<str>,
    stats: Arc<GateStats>,
    _permit: OwnedSemaphorePermit,
}

impl GatePermit {
    /// Name of the gate this permit belongs to.
    pub fn gate(&self) -> &str {
        &self.name
    }
}

impl Drop for GatePermit {
    fn drop(&mut self) {
        // Counters drop before the semaphore permit (fields drop after this),
        // so in_flight never exceeds capacity.
        self.stats.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.stats.released.fetch_add(1, Ordering::Relaxed);
        GATE_IN_FLIGHT.with_label_values(&[&*self.name]).dec();
    }
}
