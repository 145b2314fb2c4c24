//! Batch runner: labels one batch of items on a running video service.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vidwarn_core::{
    load_config, load_default_config, validate_config, BatchOrchestrator, Config, GateSet,
    HttpVideoService, OrchestratorError, PipelineProgress,
};

const CONFIG_ENV: &str = "VIDWARN_CONFIG";

/// Buffer size for progress events
const PROGRESS_BUFFER_SIZE: usize = 1024;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = read_config()?;
    validate_config(&config).context("Configuration validation failed")?;

    let service = Arc::new(
        HttpVideoService::new(&config.client).context("Failed to build service client")?,
    );
    info!(base_url = service.base_url(), "Using video service");

    let gates = Arc::new(GateSet::from_config(&config.gates));
    let (tx, rx) = mpsc::channel(PROGRESS_BUFFER_SIZE);
    let orchestrator = BatchOrchestrator::new(
        service,
        gates,
        config.classifier.clone(),
        config.batch.clone(),
    )
    .with_progress(tx);

    let progress = tokio::spawn(log_progress(rx));

    let shutdown = orchestrator.shutdown_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling batch");
            shutdown.cancel();
        }
    });

    let result = orchestrator.run_batch().await;
    drop(orchestrator);
    let _ = progress.await;

    match result {
        Ok(report) => {
            let summary = report.summary();
            info!(
                run_id = %summary.run_id,
                total = summary.total,
                done = summary.done,
                labelled = summary.labelled,
                failed = summary.failed,
                cancelled = summary.cancelled,
                elapsed_ms = summary.elapsed_ms,
                "Batch finished"
            );
            if !summary.all_done() {
                bail!(
                    "{} of {} items did not complete",
                    summary.total - summary.done,
                    summary.total
                );
            }
            Ok(())
        }
        Err(OrchestratorError::Aborted {
            item_id, report, ..
        }) => {
            let summary = report.summary();
            error!(
                run_id = %summary.run_id,
                item_id = %item_id,
                done = summary.done,
                cancelled = summary.cancelled,
                "Batch aborted"
            );
            bail!("batch aborted after {} failed", item_id)
        }
        Err(e) => Err(e).context("Batch failed"),
    }
}

fn read_config() -> Result<Config> {
    match std::env::var(CONFIG_ENV) {
        Ok(path) => {
            let path = PathBuf::from(path);
            load_config(&path).with_context(|| format!("Failed to load config from {:?}", path))
        }
        Err(_) => load_default_config().context("Failed to load default config"),
    }
}

async fn log_progress(mut rx: mpsc::Receiver<PipelineProgress>) {
    while let Some(event) = rx.recv().await {
        match event {
            PipelineProgress::Stage { item_id, stage } => {
                debug!(item_id = %item_id, stage = %stage, "Stage");
            }
            PipelineProgress::Completed {
                item_id,
                warnings,
                elapsed_ms,
            } => {
                if !warnings.is_empty() {
                    info!(
                        item_id = %item_id,
                        warnings = ?warnings.iter().collect::<Vec<_>>(),
                        elapsed_ms,
                        "Labelled"
                    );
                }
            }
            PipelineProgress::Failed { .. } => {}
        }
    }
}
