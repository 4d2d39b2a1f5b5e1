//! Prometheus metrics for pos-service.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram_vec, CounterVec, HistogramVec, TextEncoder,
};

/// Commit attempts by outcome (committed, rejected, failed).
pub static COMMITS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "pos_commits_total",
        "Total number of invoice commit attempts by outcome",
        &["outcome"]
    )
    .expect("Failed to register commits_total")
});

/// Reprint requests by outcome (marked, ignored, failed).
pub static REPRINTS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "pos_reprints_total",
        "Total number of reprint requests by outcome",
        &["outcome"]
    )
    .expect("Failed to register reprints_total")
});

/// Cart mutations by operation (add, edit, delete).
pub static LINE_OPERATIONS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "pos_line_operations_total",
        "Total number of cart line operations",
        &["operation"]
    )
    .expect("Failed to register line_operations_total")
});

/// Error counter for alerting.
pub static ERRORS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "pos_errors_total",
        "Total number of errors by type",
        &["error_type"]
    )
    .expect("Failed to register errors_total")
});

/// Remote store call duration histogram.
pub static STORE_CALL_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "pos_store_call_duration_seconds",
        "Remote record store call duration in seconds",
        &["operation"],
        vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .expect("Failed to register store_call_duration")
});

/// Initialize all metrics (forces lazy initialization).
pub fn init_metrics() {
    Lazy::force(&COMMITS_TOTAL);
    Lazy::force(&REPRINTS_TOTAL);
    Lazy::force(&LINE_OPERATIONS_TOTAL);
    Lazy::force(&ERRORS_TOTAL);
    Lazy::force(&STORE_CALL_DURATION);
}

/// Get metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    encoder
        .encode_to_string(&metric_families)
        .unwrap_or_default()
}
