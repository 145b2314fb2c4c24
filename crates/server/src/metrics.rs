//! Prometheus metrics for the service simulator.
//!
//! - HTTP request metrics (latency, counts, in flight)
//! - Simulated degradation (applied delay, queued waiters per operation)
//! - Catalog size (collected dynamically)
//! - Core metrics (gates, service client, pipelines)

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, IntGaugeVec, Opts,
    Registry, TextEncoder,
};
use tracing::warn;

use crate::state::AppState;

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "vidwarn_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("vidwarn_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "vidwarn_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

// =============================================================================
// Degradation Metrics
// =============================================================================

/// Delay applied to each simulated call.
pub static SIMULATED_DELAY: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "vidwarn_simulated_delay_seconds",
            "Latency added to simulated operations",
        )
        .buckets(vec![0.01, 0.05, 0.1, 0.2, 0.3, 0.5, 0.75, 1.0, 1.5, 2.0, 3.0]),
        &["operation"],
    )
    .unwrap()
});

/// Callers queued per operation (collected dynamically).
pub static SIMULATOR_WAITERS: Lazy<IntGaugeVec> = Lazy::new(|| {
    IntGaugeVec::new(
        Opts::new(
            "vidwarn_simulator_waiters",
            "Callers waiting for a simulated operation slot",
        ),
        &["operation"],
    )
    .unwrap()
});

/// Items in the simulated catalog (collected dynamically).
pub static CATALOG_ITEMS: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new("vidwarn_catalog_items", "Items in the simulated catalog").unwrap()
});

fn register_metrics(registry: &Registry) {
    let local: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(HTTP_REQUEST_DURATION.clone()),
        Box::new(HTTP_REQUESTS_TOTAL.clone()),
        Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()),
        Box::new(SIMULATED_DELAY.clone()),
        Box::new(SIMULATOR_WAITERS.clone()),
        Box::new(CATALOG_ITEMS.clone()),
    ];

    // Core metrics (gates, service client, pipelines)
    for metric in local.into_iter().chain(vidwarn_core::metrics::all_metrics()) {
        if let Err(e) = registry.register(metric) {
            warn!(error = %e, "Failed to register metric");
        }
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        warn!(error = %e, "Failed to encode metrics");
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

/// Collect dynamic metrics from current application state.
pub fn collect_dynamic_metrics(state: &AppState) {
    for gate in state.gates() {
        SIMULATOR_WAITERS
            .with_label_values(&[gate.operation().as_str()])
            .set(gate.waiters() as i64);
    }
    CATALOG_ITEMS.set(state.catalog().len() as i64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_metrics_returns_prometheus_format() {
        HTTP_REQUESTS_TOTAL
            .with_label_values(&["GET", "/test", "200"])
            .inc();

        let output = encode_metrics();
        assert!(output.contains("vidwarn_http_requests_total"));
        assert!(output.contains("# HELP"));
        assert!(output.contains("# TYPE"));
    }

    #[test]
    fn test_registry_contains_simulator_and_core_metrics() {
        // Vec metrics only appear once a label set has been touched
        HTTP_REQUEST_DURATION
            .with_label_values(&["GET", "/test", "200"])
            .observe(0.1);
        HTTP_REQUESTS_IN_FLIGHT.set(0);
        SIMULATED_DELAY.with_label_values(&["get_item"]).observe(0.2);
        SIMULATOR_WAITERS.with_label_values(&["get_item"]).set(0);
        CATALOG_ITEMS.set(0);
        vidwarn_core::metrics::PIPELINES_TOTAL
            .with_label_values(&["success"])
            .inc_by(0);

        let output = encode_metrics();

        assert!(output.contains("vidwarn_http_request_duration_seconds"));
        assert!(output.contains("vidwarn_http_requests_in_flight"));
        assert!(output.contains("vidwarn_simulated_delay_seconds"));
        assert!(output.contains("vidwarn_simulator_waiters"));
        assert!(output.contains("vidwarn_catalog_items"));
        assert!(output.contains("vidwarn_pipelines_total"));
    }
}
