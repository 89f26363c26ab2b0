//! Prometheus metrics for pantry-service.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram_vec, register_int_counter, CounterVec,
    HistogramVec, IntCounter, TextEncoder,
};
use std::sync::OnceLock;

/// Recorder behind the `metrics` facade used by the HTTP middleware.
pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Recorded entries by action.
pub static ENTRIES_RECORDED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "pantry_entries_recorded_total",
        "Total number of entries recorded by action",
        &["action"] // Issued, Returned
    )
    .expect("Failed to register entries_recorded_total")
});

/// Composed bills by time window.
pub static BILLS_COMPOSED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "pantry_bills_composed_total",
        "Total number of bills composed by window",
        &["window"]
    )
    .expect("Failed to register bills_composed_total")
});

/// Entry rows dropped because their date did not parse.
pub static DATE_PARSE_SKIPPED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "pantry_date_parse_skipped_total",
        "Total number of entry rows skipped for an unparseable date"
    )
    .expect("Failed to register date_parse_skipped_total")
});

/// Error counter for alerting.
pub static ERRORS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "pantry_errors_total",
        "Total number of errors by type",
        &["error_type"]
    )
    .expect("Failed to register errors_total")
});

/// Sheet operation duration histogram.
pub static STORE_OP_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "pantry_store_op_duration_seconds",
        "Sheet store operation duration in seconds",
        &["operation"],
        vec![0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]
    )
    .expect("Failed to register store_op_duration")
});

/// Initialize all metrics (forces lazy initialization) and install the
/// facade recorder. Safe to call more than once.
pub fn init_metrics() {
    Lazy::force(&ENTRIES_RECORDED_TOTAL);
    Lazy::force(&BILLS_COMPOSED_TOTAL);
    Lazy::force(&DATE_PARSE_SKIPPED_TOTAL);
    Lazy::force(&ERRORS_TOTAL);
    Lazy::force(&STORE_OP_DURATION);

    METRICS_HANDLE.get_or_init(|| {
        PrometheusBuilder::new()
            .install_recorder()
            .expect("failed to install Prometheus recorder")
    });
}

/// Get metrics in Prometheus text format: the pantry registry followed by
/// the HTTP metrics from the facade recorder.
pub fn get_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut body = encoder
        .encode_to_string(&metric_families)
        .unwrap_or_default();

    if let Some(handle) = METRICS_HANDLE.get() {
        body.push_str(&handle.render());
    }
    body
}
