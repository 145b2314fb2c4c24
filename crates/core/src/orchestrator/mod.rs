//! Batch orchestrator.
//!
//! Launches one [`ItemPipeline`](crate::pipeline::ItemPipeline) per item and
//! waits for all of them:
//! - **Fan-out**: every pipeline is spawned at once; only the gates limit
//!   how many make progress.
//! - **Fail-fast**: the first failure cancels the rest of the batch.
//! - **Fail-soft**: every pipeline runs to completion; failures are reported
//!   per item.

mod config;
mod runner;
mod types;

pub use config::{BatchConfig, CompletionPolicy};
pub use runner::BatchOrchestrator;
pub use types::{BatchReport, BatchSummary, OrchestratorError, OrchestratorStatus};
