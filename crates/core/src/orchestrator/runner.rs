//! Batch orchestrator implementation.
//!
//! Fans out one pipeline per item and waits for all of them. The gates are
//! the only admission control: every pipeline is spawned immediately.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::classifier::{ClassificationStage, ClassifierConfig};
use crate::fetcher::GatedFetcher;
use crate::gate::GateSet;
use crate::pipeline::{ItemPipeline, ItemReport, PipelineError, PipelineProgress, PipelineStage};
use crate::service::VideoService;

use super::config::{BatchConfig, CompletionPolicy};
use super::types::{BatchReport, OrchestratorError, OrchestratorStatus};

/// Decrements the active pipeline count when a pipeline task ends.
struct ActiveGuard(Arc<AtomicUsize>);

impl ActiveGuard {
    fn enter(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter.clone())
    }
}

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// The batch orchestrator - runs item pipelines concurrently.
pub struct BatchOrchestrator {
    config: BatchConfig,
    pipeline: ItemPipeline,
    gates: Arc<GateSet>,

    // Runtime state
    shutdown: CancellationToken,
    active: Arc<AtomicUsize>,
    batches_started: AtomicU64,
}

impl BatchOrchestrator {
    /// Create a new orchestrator.
    pub fn new(
        service: Arc<dyn VideoService>,
        gates: Arc<GateSet>,
        classifier: ClassifierConfig,
        config: BatchConfig,
    ) -> Self {
        let fetcher = GatedFetcher::new(service, gates.clone());
        let classifier = ClassificationStage::new(classifier, gates.classification.clone());

        Self {
            config,
            pipeline: ItemPipeline::new(fetcher, classifier),
            gates,
            shutdown: CancellationToken::new(),
            active: Arc::new(AtomicUsize::new(0)),
            batches_started: AtomicU64::new(0),
        }
    }

    /// Emit pipeline progress events on `tx`.
    pub fn with_progress(mut self, tx: mpsc::Sender<PipelineProgress>) -> Self {
        self.pipeline = self.pipeline.with_progress(tx);
        self
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Token that cancels every running batch when triggered.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    pub fn status(&self) -> OrchestratorStatus {
        OrchestratorStatus {
            active_pipelines: self.active.load(Ordering::SeqCst),
            batches_started: self.batches_started.load(Ordering::SeqCst),
            gates: self.gates.status(),
        }
    }

    /// Lists `config.size` item ids from the service and runs them.
    pub async fn run_batch(&self) -> Result<BatchReport, OrchestratorError> {
        let ids = self
            .pipeline
            .fetcher()
            .list_items(self.config.size)
            .await?;
        info!(count = ids.len(), "Listed items");
        self.run(ids).await
    }

    /// Runs one pipeline per id and waits for all of them.
    ///
    /// Under [`CompletionPolicy::FailFast`] the first failure cancels the
    /// remaining pipelines and is returned as [`OrchestratorError::Aborted`].
    /// Under [`CompletionPolicy::FailSoft`] every pipeline runs to completion
    /// and failures are reported per item.
    pub async fn run(&self, ids: Vec<String>) -> Result<BatchReport, OrchestratorError> {
        let run_id = Uuid::new_v4();
        let span = info_span!("batch", %run_id);
        self.batches_started.fetch_add(1, Ordering::SeqCst);
        self.run_inner(run_id, ids).instrument(span).await
    }

    async fn run_inner(
        &self,
        run_id: Uuid,
        ids: Vec<String>,
    ) -> Result<BatchReport, OrchestratorError> {
        let policy = self.config.policy;
        let started = Instant::now();
        let cancel = self.shutdown.child_token();

        info!(items = ids.len(), policy = policy.as_str(), "Starting batch");

        let mut tasks = JoinSet::new();
        let mut positions = HashMap::with_capacity(ids.len());
        for (index, item_id) in ids.iter().enumerate() {
            let pipeline = self.pipeline.clone();
            let cancel = cancel.clone();
            let item_id = item_id.clone();
            let guard = ActiveGuard::enter(&self.active);
            let handle = tasks.spawn(
                async move {
                    let _guard = guard;
                    pipeline.run(&item_id, &cancel).await
                }
                .in_current_span(),
            );
            positions.insert(handle.id(), index);
        }

        let mut reports: Vec<Option<ItemReport>> = vec![None; ids.len()];
        let mut first_failure: Option<(String, PipelineError)> = None;

        while let Some(joined) = tasks.join_next_with_id().await {
            let (index, report) = match joined {
                Ok((id, report)) => (positions.get(&id).copied(), report),
                Err(e) => {
                    let index = positions.get(&e.id()).copied();
                    let item_id = index.map(|i| ids[i].clone()).unwrap_or_default();
                    warn!(item_id = %item_id, error = %e, "Pipeline task failed");
                    let error = PipelineError::Panicked {
                        item_id: item_id.clone(),
                        reason: e.to_string(),
                    };
                    let report = ItemReport {
                        item_id,
                        stage: PipelineStage::Failed,
                        failed_stage: None,
                        outcome: Err(error),
                        elapsed: started.elapsed(),
                    };
                    (index, report)
                }
            };

            if let Err(e) = &report.outcome {
                if policy == CompletionPolicy::FailFast
                    && first_failure.is_none()
                    && !e.is_cancelled()
                {
                    warn!(item_id = %report.item_id, error = %e, "Aborting batch");
                    first_failure = Some((report.item_id.clone(), e.clone()));
                    cancel.cancel();
                }
            }

            if let Some(index) = index {
                reports[index] = Some(report);
            }
        }

        let report = BatchReport {
            run_id,
            policy,
            reports: reports.into_iter().flatten().collect(),
            elapsed: started.elapsed(),
        };
        let summary = report.summary();
        info!(
            done = summary.done,
            labelled = summary.labelled,
            failed = summary.failed,
            cancelled = summary.cancelled,
            elapsed_ms = summary.elapsed_ms,
            "Batch finished"
        );

        match first_failure {
            Some((item_id, source)) => Err(OrchestratorError::Aborted {
                item_id,
                source,
                report: Box::new(report),
            }),
            None => Ok(report),
        }
    }
}

impl std::fmt::Debug for BatchOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchOrchestrator")
            .field("config", &self.config)
            .field("active", &self.active.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}
