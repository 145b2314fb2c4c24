//! Types for the item pipeline.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::WarningSet;
use crate::classifier::{ClassificationError, ClassificationResult};
use crate::fetcher::FetchError;
use crate::gate::GateError;
use crate::service::ServiceError;

/// State of one item's pipeline.
///
/// `Fetching → Classifying → Persisting → Done`, with `Failed` reachable
/// from any non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Fetching,
    Classifying,
    Persisting,
    Done,
    Failed,
}

impl PipelineStage {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fetching => "fetching",
            Self::Classifying => "classifying",
            Self::Persisting => "persisting",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why an item's pipeline failed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PipelineError {
    /// The item or its transcript does not exist.
    #[error("item not found: {0}")]
    NotFound(String),

    #[error("fetch failed for {item_id}: {source}")]
    FetchFailed {
        item_id: String,
        source: ServiceError,
    },

    #[error("persist failed for {item_id}: {source}")]
    PersistFailed {
        item_id: String,
        source: ServiceError,
    },

    #[error("classification failed for {item_id}: {reason}")]
    ClassificationFailed { item_id: String, reason: String },

    #[error("{0}")]
    GateClosed(GateError),

    /// The batch was aborted before this pipeline finished.
    #[error("pipeline cancelled: {0}")]
    Cancelled(String),

    /// The pipeline task panicked.
    #[error("pipeline for {item_id} panicked: {reason}")]
    Panicked { item_id: String, reason: String },
}

impl PipelineError {
    /// Short label for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::FetchFailed { .. } => "fetch_failed",
            Self::PersistFailed { .. } => "persist_failed",
            Self::ClassificationFailed { .. } => "classification_failed",
            Self::GateClosed(_) => "gate_closed",
            Self::Cancelled(_) => "cancelled",
            Self::Panicked { .. } => "panicked",
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }

    pub(crate) fn from_fetch(item_id: &str, err: FetchError) -> Self {
        match err {
            FetchError::Gate(e) => Self::GateClosed(e),
            FetchError::Service(ServiceError::NotFound(_)) => Self::NotFound(item_id.to_string()),
            FetchError::Service(source) => Self::FetchFailed {
                item_id: item_id.to_string(),
                source,
            },
        }
    }

    pub(crate) fn from_persist(item_id: &str, err: FetchError) -> Self {
        match err {
            FetchError::Gate(e) => Self::GateClosed(e),
            FetchError::Service(ServiceError::NotFound(_)) => Self::NotFound(item_id.to_string()),
            FetchError::Service(source) => Self::PersistFailed {
                item_id: item_id.to_string(),
                source,
            },
        }
    }

    pub(crate) fn from_classification(item_id: &str, err: ClassificationError) -> Self {
        match err {
            ClassificationError::Gate(e) => Self::GateClosed(e),
            ClassificationError::Worker(reason) => Self::ClassificationFailed {
                item_id: item_id.to_string(),
                reason,
            },
        }
    }
}

/// Progress events emitted while pipelines run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PipelineProgress {
    /// The pipeline entered a non-terminal stage.
    Stage {
        item_id: String,
        stage: PipelineStage,
    },
    /// Warnings were persisted.
    Completed {
        item_id: String,
        warnings: WarningSet,
        elapsed_ms: u64,
    },
    Failed {
        item_id: String,
        stage: PipelineStage,
        error: String,
    },
}

impl PipelineProgress {
    pub fn item_id(&self) -> &str {
        match self {
            Self::Stage { item_id, .. }
            | Self::Completed { item_id, .. }
            | Self::Failed { item_id, .. } => item_id,
        }
    }
}

/// Outcome of one item's pipeline.
#[derive(Debug, Clone)]
pub struct ItemReport {
    pub item_id: String,
    /// `Done` or `Failed`.
    pub stage: PipelineStage,
    /// Stage the pipeline was in when it failed.
    pub failed_stage: Option<PipelineStage>,
    pub outcome: Result<ClassificationResult, PipelineError>,
    pub elapsed: Duration,
}

impl ItemReport {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    /// Persisted warnings, if the pipeline reached `Done`.
    pub fn warnings(&self) -> Option<&WarningSet> {
        self.outcome.as_ref().ok().map(|r| &r.warnings)
    }

    pub fn error(&self) -> Option<&PipelineError> {
        self.outcome.as_ref().err()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_terminal() {
        assert!(PipelineStage::Done.is_terminal());
        assert!(PipelineStage::Failed.is_terminal());
        assert!(!PipelineStage::Persisting.is_terminal());
        assert_eq!(PipelineStage::Classifying.to_string(), "classifying");
    }

    #[test]
    fn test_from_fetch_maps_not_found() {
        let err = PipelineError::from_fetch(
            "orbit",
            FetchError::Service(ServiceError::NotFound("orbit".to_string())),
        );
        assert_eq!(err, PipelineError::NotFound("orbit".to_string()));
        assert_eq!(err.kind(), "not_found");

        let err = PipelineError::from_fetch(
            "orbit",
            FetchError::Service(ServiceError::Transport("reset".to_string())),
        );
        assert_eq!(err.kind(), "fetch_failed");
        assert_eq!(
            err.to_string(),
            "fetch failed for orbit: transport failure: reset"
        );
    }

    #[test]
    fn test_from_persist_keeps_stage() {
        let err = PipelineError::from_persist(
            "orbit",
            FetchError::Service(ServiceError::Remote {
                status: 500,
                message: "boom".to_string(),
            }),
        );
        assert_eq!(err.kind(), "persist_failed");
    }

    #[test]
    fn test_progress_serializes_tagged() {
        let event = PipelineProgress::Stage {
            item_id: "orbit".to_string(),
            stage: PipelineStage::Fetching,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "stage");
        assert_eq!(json["stage"], "fetching");
        assert_eq!(event.item_id(), "orbit");
    }
}
