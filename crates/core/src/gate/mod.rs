//! Client-side admission control.
//!
//! Three kinds of gate guard the client:
//! - **Resource gates**: one per remote resource type (`metadata`,
//!   `transcript`), so saturating one cannot starve the other.
//! - **Connection budget**: a global cap on outbound calls, layered under the
//!   resource gates and also covering listing and write-back.
//! - **Classification gate**: bounds CPU work on the blocking pool.
//!
//! Gates are plain values owned by whoever builds the [`GateSet`] and are
//! passed explicitly to the components that use them.

mod budget;
mod concurrency;
mod config;
mod types;

pub use budget::ConnectionBudget;
pub use concurrency::{ConcurrencyGate, GatePermit};
pub use config::GateConfig;
pub use types::{GateError, GateStatus};

/// All gates used by one orchestrator.
#[derive(Debug, Clone)]
pub struct GateSet {
    pub metadata: ConcurrencyGate,
    pub transcript: ConcurrencyGate,
    pub classification: ConcurrencyGate,
    pub connections: ConnectionBudget,
}

impl GateSet {
    pub fn from_config(config: &GateConfig) -> Self {
        Self {
            metadata: ConcurrencyGate::new("metadata", config.metadata_capacity),
            transcript: ConcurrencyGate::new("transcript", config.transcript_capacity),
            classification: ConcurrencyGate::new(
                "classification",
                config.classification_capacity,
            ),
            connections: ConnectionBudget::new(config.connection_budget),
        }
    }

    /// Closes every gate; waiters fail with [`GateError::Closed`].
    pub fn close(&self) {
        self.metadata.close();
        self.transcript.close();
        self.classification.close();
        self.connections.close();
    }

    pub fn status(&self) -> Vec<GateStatus> {
        vec![
            self.metadata.status(),
            self.transcript.status(),
            self.classification.status(),
            self.connections.status(),
        ]
    }
}

impl Default for GateSet {
    fn default() -> Self {
        Self::from_config(&GateConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_set_from_config() {
        let config = GateConfig::default()
            .with_metadata_capacity(3)
            .with_transcript_capacity(7)
            .with_connection_budget(11)
            .with_classification_capacity(2);
        let gates = GateSet::from_config(&config);

        let status = gates.status();
        let names: Vec<_> = status.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["metadata", "transcript", "classification", "connections"]
        );
        let capacities: Vec<_> = status.iter().map(|s| s.capacity).collect();
        assert_eq!(capacities, vec![3, 7, 2, 11]);
    }

    #[tokio::test]
    async fn test_resource_gates_are_independent() {
        let gates = GateSet::from_config(&GateConfig::default().with_metadata_capacity(1));
        let _metadata = gates.metadata.acquire().await.unwrap();

        // Metadata is saturated; transcript still admits immediately.
        let transcript = gates.transcript.acquire().await.unwrap();
        assert_eq!(transcript.gate(), "transcript");
    }

    #[tokio::test]
    async fn test_close_all() {
        let gates = GateSet::default();
        gates.close();
        assert!(gates.metadata.acquire().await.is_err());
        assert!(gates.connections.acquire().await.is_err());
    }
}
