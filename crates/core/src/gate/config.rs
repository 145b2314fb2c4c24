//! Configuration for client-side gates.

use serde::{Deserialize, Serialize};

/// Capacities of the client-side gates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateConfig {
    /// Maximum concurrent metadata fetches.
    #[serde(default = "default_metadata_capacity")]
    pub metadata_capacity: usize,

    /// Maximum concurrent transcript fetches.
    #[serde(default = "default_transcript_capacity")]
    pub transcript_capacity: usize,

    /// Maximum simultaneous outbound calls of any kind.
    #[serde(default = "default_connection_budget")]
    pub connection_budget: usize,

    /// Maximum classifications running on the blocking pool.
    #[serde(default = "default_classification_capacity")]
    pub classification_capacity: usize,
}

fn default_metadata_capacity() -> usize {
    5
}

fn default_transcript_capacity() -> usize {
    10
}

fn default_connection_budget() -> usize {
    50
}

fn default_classification_capacity() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            metadata_capacity: default_metadata_capacity(),
            transcript_capacity: default_transcript_capacity(),
            connection_budget: default_connection_budget(),
            classification_capacity: default_classification_capacity(),
        }
    }
}

impl GateConfig {
    /// Sets the metadata gate capacity.
    pub fn with_metadata_capacity(mut self, capacity: usize) -> Self {
        self.metadata_capacity = capacity;
        self
    }

    /// Sets the transcript gate capacity.
    pub fn with_transcript_capacity(mut self, capacity: usize) -> Self {
        self.transcript_capacity = capacity;
        self
    }

    /// Sets the connection budget.
    pub fn with_connection_budget(mut self, capacity: usize) -> Self {
        self.connection_budget = capacity;
        self
    }

    /// Sets the classification gate capacity.
    pub fn with_classification_capacity(mut self, capacity: usize) -> Self {
        self.classification_capacity = capacity;
        self
    }
}
