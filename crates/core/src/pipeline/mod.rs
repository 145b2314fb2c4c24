//! Per-item pipeline.
//!
//! Each item goes `Fetching → Classifying → Persisting → Done`, or ends in
//! `Failed`. A failed pipeline never writes warnings back.

mod runner;
mod types;

pub use runner::ItemPipeline;
pub use types::{ItemReport, PipelineError, PipelineProgress, PipelineStage};
