//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Gates (wait time, slots in use)
//! - Remote service calls
//! - Item pipelines and classification

use once_cell::sync::Lazy;
use prometheus::{Histogram, HistogramOpts, HistogramVec, IntCounterVec, IntGaugeVec, Opts};

// =============================================================================
// Gates
// =============================================================================

/// Time spent waiting for a gate slot.
pub static GATE_WAIT_SECONDS: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "vidwarn_gate_wait_seconds",
            "Time spent waiting for a gate slot",
        )
        .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        &["gate"], // "metadata", "transcript", "classification", "connections"
    )
    .unwrap()
});

/// Slots currently held per gate.
pub static GATE_IN_FLIGHT: Lazy<IntGaugeVec> = Lazy::new(|| {
    IntGaugeVec::new(
        Opts::new("vidwarn_gate_in_flight", "Gate slots currently held"),
        &["gate"],
    )
    .unwrap()
});

// =============================================================================
// Remote service
// =============================================================================

/// Remote service request duration in seconds.
pub static SERVICE_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "vidwarn_service_request_duration_seconds",
            "Duration of video service requests",
        )
        .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0]),
        &["operation", "status"], // status: "success", or an error kind
    )
    .unwrap()
});

/// Remote service requests total.
pub static SERVICE_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "vidwarn_service_requests_total",
            "Total video service requests",
        ),
        &["operation", "status"],
    )
    .unwrap()
});

// =============================================================================
// Pipelines
// =============================================================================

/// Item pipelines finished, by result.
pub static PIPELINES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("vidwarn_pipelines_total", "Total item pipelines finished"),
        &["result"], // "success", "not_found", "fetch_failed", ...
    )
    .unwrap()
});

/// Item pipeline duration in seconds.
pub static PIPELINE_DURATION: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "vidwarn_pipeline_duration_seconds",
            "Duration of one item pipeline",
        )
        .buckets(vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]),
    )
    .unwrap()
});

/// Classification duration in seconds, slot wait excluded.
pub static CLASSIFICATION_DURATION: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "vidwarn_classification_duration_seconds",
            "Duration of one classification",
        )
        .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5]),
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Gates
        Box::new(GATE_WAIT_SECONDS.clone()),
        Box::new(GATE_IN_FLIGHT.clone()),
        // Remote service
        Box::new(SERVICE_REQUEST_DURATION.clone()),
        Box::new(SERVICE_REQUESTS.clone()),
        // Pipelines
        Box::new(PIPELINES_TOTAL.clone()),
        Box::new(PIPELINE_DURATION.clone()),
        Box::new(CLASSIFICATION_DURATION.clone()),
    ]
}
