//! Batch configuration.

use serde::{Deserialize, Serialize};

/// What a batch does when one item's pipeline fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionPolicy {
    /// Abort the batch on the first failure: outstanding pipelines are
    /// cancelled and the failure is surfaced to the caller.
    #[default]
    FailFast,
    /// Let every pipeline finish and report per-item outcomes.
    FailSoft,
}

impl CompletionPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FailFast => "fail_fast",
            Self::FailSoft => "fail_soft",
        }
    }
}

/// Configuration for the batch orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Number of item ids requested from the service for one batch.
    #[serde(default = "default_size")]
    pub size: usize,

    #[serde(default)]
    pub policy: CompletionPolicy,
}

fn default_size() -> usize {
    100
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            size: default_size(),
            policy: CompletionPolicy::default(),
        }
    }
}

impl BatchConfig {
    pub fn with_size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }

    pub fn with_policy(mut self, policy: CompletionPolicy) -> Self {
        self.policy = policy;
        self
    }
}
