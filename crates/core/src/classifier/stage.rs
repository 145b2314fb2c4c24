//! Runs the classifier off the I/O runtime.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha512};
use thiserror::Error;
use tracing::debug;

use crate::catalog::WarningSet;
use crate::gate::{ConcurrencyGate, GateError};
use crate::metrics::CLASSIFICATION_DURATION;

use super::config::ClassifierConfig;
use super::rules::classify;

/// Labels produced for one item by one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub item_id: String,
    pub warnings: WarningSet,
}

#[derive(Debug, Error)]
pub enum ClassificationError {
    #[error(transparent)]
    Gate(#[from] GateError),

    /// The blocking task panicked or was cancelled.
    #[error("classification worker failed: {0}")]
    Worker(String),
}

/// Burns a repeatable amount of CPU.
///
/// Returns a byte derived from the digests so the work cannot be optimized
/// away.
pub fn simulate_model_cost(rounds: u32, bytes: usize) -> u8 {
    if rounds == 0 || bytes == 0 {
        return 0;
    }
    let buffer = vec![b'a'; bytes];
    let mut acc = 0u8;
    for _ in 0..rounds {
        let digest = Sha512::digest(&buffer);
        acc ^= digest[0];
    }
    std::hint::black_box(acc)
}

/// The classification stage of the pipeline.
///
/// Work is dispatched to tokio's blocking pool, so a running classification
/// never occupies a runtime worker that is progressing network I/O. The
/// classification gate bounds how many run at once.
#[derive(Debug, Clone)]
pub struct ClassificationStage {
    config: ClassifierConfig,
    gate: ConcurrencyGate,
}

impl ClassificationStage {
    pub fn new(config: ClassifierConfig, gate: ConcurrencyGate) -> Self {
        Self { config, gate }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Classifies `text` for `item_id`.
    ///
    /// If the caller stops awaiting, the blocking computation still runs to
    /// completion and then releases its classification slot.
    pub async fn run(
        &self,
        item_id: &str,
        text: String,
    ) -> Result<ClassificationResult, ClassificationError> {
        let permit = self.gate.acquire().await?;
        let rounds = self.config.work_rounds;
        let bytes = self.config.work_bytes;

        debug!(item_id, "Run model");
        let started = Instant::now();

        let warnings = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            simulate_model_cost(rounds, bytes);
            classify(&text)
        })
        .await
        .map_err(|e| ClassificationError::Worker(e.to_string()))?;

        let elapsed = started.elapsed();
        CLASSIFICATION_DURATION.observe(elapsed.as_secs_f64());
        debug!(
            item_id,
            elapsed_ms = elapsed.as_millis() as u64,
            labels = warnings.len(),
            "Finished model"
        );

        Ok(ClassificationResult {
            item_id: item_id.to_string(),
            warnings,
        })
    }
}
