//! Drives one item from fetch to write-back.

use std::time::Instant;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::classifier::{ClassificationResult, ClassificationStage};
use crate::fetcher::GatedFetcher;
use crate::metrics::{PIPELINES_TOTAL, PIPELINE_DURATION};

use super::types::{ItemReport, PipelineError, PipelineProgress, PipelineStage};

/// The per-item pipeline: fetch metadata and transcript concurrently,
/// classify, then persist the full warning set.
///
/// Cheap to clone; one value is shared by every pipeline of a batch.
#[derive(Debug, Clone)]
pub struct ItemPipeline {
    fetcher: GatedFetcher,
    classifier: ClassificationStage,
    progress: Option<mpsc::Sender<PipelineProgress>>,
}

impl ItemPipeline {
    pub fn new(fetcher: GatedFetcher, classifier: ClassificationStage) -> Self {
        Self {
            fetcher,
            classifier,
            progress: None,
        }
    }

    /// Emit progress events on `tx`.
    ///
    /// Events are dropped when the channel is full.
    pub fn with_progress(mut self, tx: mpsc::Sender<PipelineProgress>) -> Self {
        self.progress = Some(tx);
        self
    }

    pub fn fetcher(&self) -> &GatedFetcher {
        &self.fetcher
    }

    /// Runs the pipeline for `item_id` to a terminal stage.
    ///
    /// Cancelling `cancel` drops whatever call is outstanding, which releases
    /// every gate slot the pipeline holds. A classification already running
    /// on the blocking pool finishes in the background, but its result is
    /// never persisted.
    pub async fn run(&self, item_id: &str, cancel: &CancellationToken) -> ItemReport {
        let started = Instant::now();
        let mut stage = PipelineStage::Fetching;

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(PipelineError::Cancelled(item_id.to_string())),
            result = self.execute(item_id, &mut stage) => result,
        };

        let elapsed = started.elapsed();
        PIPELINE_DURATION.observe(elapsed.as_secs_f64());

        match outcome {
            Ok(result) => {
                PIPELINES_TOTAL.with_label_values(&["success"]).inc();
                debug!(
                    item_id,
                    labels = result.warnings.len(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Pipeline done"
                );
                self.emit(PipelineProgress::Completed {
                    item_id: item_id.to_string(),
                    warnings: result.warnings.clone(),
                    elapsed_ms: elapsed.as_millis() as u64,
                });
                ItemReport {
                    item_id: item_id.to_string(),
                    stage: PipelineStage::Done,
                    failed_stage: None,
                    outcome: Ok(result),
                    elapsed,
                }
            }
            Err(e) => {
                PIPELINES_TOTAL.with_label_values(&[e.kind()]).inc();
                if e.is_cancelled() {
                    debug!(item_id, stage = %stage, "Pipeline cancelled");
                } else {
                    warn!(item_id, stage = %stage, error = %e, "Pipeline failed");
                }
                self.emit(PipelineProgress::Failed {
                    item_id: item_id.to_string(),
                    stage,
                    error: e.to_string(),
                });
                ItemReport {
                    item_id: item_id.to_string(),
                    stage: PipelineStage::Failed,
                    failed_stage: Some(stage),
                    outcome: Err(e),
                    elapsed,
                }
            }
        }
    }

    async fn execute(
        &self,
        item_id: &str,
        stage: &mut PipelineStage,
    ) -> Result<ClassificationResult, PipelineError> {
        self.enter(item_id, stage, PipelineStage::Fetching);
        let (metadata, transcript) = tokio::try_join!(
            self.fetcher.fetch_item(item_id),
            self.fetcher.fetch_transcript(item_id),
        )
        .map_err(|e| PipelineError::from_fetch(item_id, e))?;

        self.enter(item_id, stage, PipelineStage::Classifying);
        let text = format!("{} {} {}", metadata.title, metadata.description, transcript);
        let result = self
            .classifier
            .run(item_id, text)
            .await
            .map_err(|e| PipelineError::from_classification(item_id, e))?;

        self.enter(item_id, stage, PipelineStage::Persisting);
        self.fetcher
            .persist_warnings(item_id, &result.warnings)
            .await
            .map_err(|e| PipelineError::from_persist(item_id, e))?;

        Ok(result)
    }

    fn enter(&self, item_id: &str, stage: &mut PipelineStage, next: PipelineStage) {
        *stage = next;
        self.emit(PipelineProgress::Stage {
            item_id: item_id.to_string(),
            stage: next,
        });
    }

    fn emit(&self, event: PipelineProgress) {
        if let Some(tx) = &self.progress {
            let _ = tx.try_send(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::ClassifierConfig;
    use crate::gate::{GateConfig, GateSet};
    use crate::service::{ServiceError, ServiceOperation};
    use crate::testing::{fixtures, MockVideoService};
    use std::sync::Arc;
    use std::time::Duration;

    fn pipeline(mock: &Arc<MockVideoService>) -> ItemPipeline {
        let gates = Arc::new(GateSet::from_config(&GateConfig::default()));
        let classifier =
            ClassificationStage::new(ClassifierConfig::instant(), gates.classification.clone());
        ItemPipeline::new(GatedFetcher::new(mock.clone(), gates), classifier)
    }

    #[tokio::test]
    async fn test_standalone_word_yields_label() {
        let mock = Arc::new(MockVideoService::with_items(vec![fixtures::item(
            "orbit",
            "and then nasa said go",
        )]));
        let report = pipeline(&mock).run("orbit", &CancellationToken::new()).await;

        assert_eq!(report.stage, PipelineStage::Done);
        assert!(report.warnings().unwrap().contains("nasa"));
        assert!(mock.warnings_of("orbit").unwrap().contains("nasa"));
    }

    #[tokio::test]
    async fn test_substring_yields_no_label_and_replaces_old_warnings() {
        let mock = Arc::new(MockVideoService::with_items(vec![
            fixtures::item_with_warnings("replica", "the nasarocket replica", &["nasa"]),
        ]));
        let report = pipeline(&mock)
            .run("replica", &CancellationToken::new())
            .await;

        assert!(report.is_success());
        assert!(report.warnings().unwrap().is_empty());
        assert!(mock.warnings_of("replica").unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_title_and_description_are_classified() {
        let mut item = fixtures::item("orbit", "nothing here");
        item.description = "Filmed at NASA".to_string();
        let mock = Arc::new(MockVideoService::with_items(vec![item]));

        let report = pipeline(&mock).run("orbit", &CancellationToken::new()).await;
        assert!(report.warnings().unwrap().contains("nasa"));
    }

    #[tokio::test]
    async fn test_unknown_item_fails_without_write_back() {
        let mock = Arc::new(MockVideoService::new());
        let report = pipeline(&mock).run("ghost", &CancellationToken::new()).await;

        assert_eq!(report.stage, PipelineStage::Failed);
        assert_eq!(report.failed_stage, Some(PipelineStage::Fetching));
        assert_eq!(
            report.error(),
            Some(&PipelineError::NotFound("ghost".to_string()))
        );
        assert!(mock
            .calls_for(ServiceOperation::UpdateWarnings)
            .await
            .is_empty());
    }

    #[tokio::test]
    async fn test_fetches_run_concurrently() {
        let mock = Arc::new(MockVideoService::with_items(vec![fixtures::item(
            "orbit", "nasa",
        )]));
        mock.set_latency(ServiceOperation::GetItem, Duration::from_millis(30))
            .await;
        mock.set_latency(ServiceOperation::GetTranscript, Duration::from_millis(30))
            .await;

        pipeline(&mock).run("orbit", &CancellationToken::new()).await;
        assert_eq!(mock.peak_total_in_flight(), 2);
    }

    #[tokio::test]
    async fn test_persist_failure_reports_persisting_stage() {
        let mock = Arc::new(MockVideoService::with_items(vec![fixtures::item(
            "orbit", "nasa",
        )]));
        mock.fail_operation(
            ServiceOperation::UpdateWarnings,
            ServiceError::Remote {
                status: 500,
                message: "disk full".to_string(),
            },
        )
        .await;

        let report = pipeline(&mock).run("orbit", &CancellationToken::new()).await;
        assert_eq!(report.failed_stage, Some(PipelineStage::Persisting));
        assert_eq!(report.error().map(|e| e.kind()), Some("persist_failed"));
        assert!(mock.warnings_of("orbit").unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_releases_gates() {
        let mock = Arc::new(MockVideoService::with_items(vec![fixtures::item(
            "orbit", "nasa",
        )]));
        mock.set_latency(ServiceOperation::GetItem, Duration::from_secs(60))
            .await;
        let pipeline = pipeline(&mock);
        let cancel = CancellationToken::new();

        let task = {
            let pipeline = pipeline.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move { pipeline.run("orbit", &cancel).await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(pipeline.fetcher().gates().metadata.status().in_flight, 1);

        cancel.cancel();
        let report = task.await.unwrap();
        assert!(report.error().unwrap().is_cancelled());
        for status in pipeline.fetcher().gates().status() {
            assert_eq!(status.in_flight, 0, "gate {} leaked a slot", status.name);
        }
        assert!(mock
            .calls_for(ServiceOperation::UpdateWarnings)
            .await
            .is_empty());
    }

    #[tokio::test]
    async fn test_progress_events_in_order() {
        let mock = Arc::new(MockVideoService::with_items(vec![fixtures::item(
            "orbit", "nasa",
        )]));
        let (tx, mut rx) = mpsc::channel(16);
        let pipeline = pipeline(&mock).with_progress(tx);

        pipeline.run("orbit", &CancellationToken::new()).await;
        drop(pipeline);

        let mut stages = Vec::new();
        let mut completed = false;
        while let Some(event) = rx.recv().await {
            match event {
                PipelineProgress::Stage { stage, .. } => stages.push(stage),
                PipelineProgress::Completed { warnings, .. } => {
                    completed = true;
                    assert!(warnings.contains("nasa"));
                }
                PipelineProgress::Failed { .. } => panic!("unexpected failure"),
            }
        }
        assert_eq!(
            stages,
            vec![
                PipelineStage::Fetching,
                PipelineStage::Classifying,
                PipelineStage::Persisting
            ]
        );
        assert!(completed);
    }

    #[tokio::test]
    async fn test_success_counted_under_success_label() {
        let mock = Arc::new(MockVideoService::with_items(vec![fixtures::item(
            "orbit", "nasa",
        )]));
        let before = PIPELINES_TOTAL.with_label_values(&["success"]).get();

        pipeline(&mock).run("orbit", &CancellationToken::new()).await;

        assert!(PIPELINES_TOTAL.with_label_values(&["success"]).get() > before);
    }
}
