//! Types for the batch orchestrator.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::fetcher::FetchError;
use crate::gate::GateStatus;
use crate::pipeline::{ItemReport, PipelineError};

use super::config::CompletionPolicy;

/// Errors that can occur during orchestration.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Listing the batch from the service failed.
    #[error("failed to list items: {0}")]
    Listing(#[from] FetchError),

    /// A pipeline failed under the fail-fast policy; the remaining pipelines
    /// were cancelled.
    #[error("batch aborted: {source}")]
    Aborted {
        item_id: String,
        source: PipelineError,
        report: Box<BatchReport>,
    },
}

impl OrchestratorError {
    /// The partial report of an aborted batch.
    pub fn report(&self) -> Option<&BatchReport> {
        match self {
            Self::Aborted { report, .. } => Some(report),
            Self::Listing(_) => None,
        }
    }
}

/// Outcome of one batch.
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub run_id: Uuid,
    pub policy: CompletionPolicy,
    /// One report per requested item, in request order.
    pub reports: Vec<ItemReport>,
    pub elapsed: Duration,
}

impl BatchReport {
    /// Reports of pipelines that did not reach `Done`.
    pub fn failures(&self) -> impl Iterator<Item = &ItemReport> {
        self.reports.iter().filter(|r| !r.is_success())
    }

    pub fn summary(&self) -> BatchSummary {
        let mut summary = BatchSummary {
            run_id: self.run_id,
            policy: self.policy,
            total: self.reports.len(),
            elapsed_ms: self.elapsed.as_millis() as u64,
            ..Default::default()
        };
        for report in &self.reports {
            match &report.outcome {
                Ok(result) => {
                    summary.done += 1;
                    if !result.warnings.is_empty() {
                        summary.labelled += 1;
                    }
                }
                Err(e) if e.is_cancelled() => summary.cancelled += 1,
                Err(_) => summary.failed += 1,
            }
        }
        summary
    }
}

/// Counts of a finished batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub run_id: Uuid,
    pub policy: CompletionPolicy,
    pub total: usize,
    pub done: usize,
    /// Items whose persisted warnings are non-empty.
    pub labelled: usize,
    pub failed: usize,
    pub cancelled: usize,
    pub elapsed_ms: u64,
}

impl BatchSummary {
    pub fn all_done(&self) -> bool {
        self.done == self.total
    }
}

/// Current status of the orchestrator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrchestratorStatus {
    /// Pipelines currently running.
    pub active_pipelines: usize,
    /// Batches started since construction.
    pub batches_started: u64,
    pub gates: Vec<GateStatus>,
}
