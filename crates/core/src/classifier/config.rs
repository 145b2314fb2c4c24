//! Configuration for the classification stage.

use serde::{Deserialize, Serialize};

/// Cost model for the classifier.
///
/// The classifier burns `work_rounds` SHA-512 passes over a `work_bytes`
/// buffer before applying its rule, so it costs real CPU time rather than
/// idle waiting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default = "default_work_rounds")]
    pub work_rounds: u32,

    #[serde(default = "default_work_bytes")]
    pub work_bytes: usize,
}

fn default_work_rounds() -> u32 {
    10
}

fn default_work_bytes() -> usize {
    8 * 1024 * 1024 // 8 MiB
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            work_rounds: default_work_rounds(),
            work_bytes: default_work_bytes(),
        }
    }
}

impl ClassifierConfig {
    /// A classifier with no simulated cost.
    pub fn instant() -> Self {
        Self {
            work_rounds: 0,
            work_bytes: 0,
        }
    }

    pub fn with_work(mut self, rounds: u32, bytes: usize) -> Self {
        self.work_rounds = rounds;
        self.work_bytes = bytes;
        self
    }
}
