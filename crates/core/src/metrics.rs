//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Catalog page fetches (counts, latency)
//! - Extraction (entries skipped for quality)
//! - Batch runs (shows processed, episodes emitted)

use once_cell::sync::Lazy;
use prometheus::{Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// Catalog Metrics
// =============================================================================

/// Release page fetches by result.
pub static PAGE_FETCHES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("relwatch_page_fetches_total", "Total release page fetches"),
        &["result"], // "success", "error"
    )
    .unwrap()
});

/// Release page fetch duration in seconds.
pub static PAGE_FETCH_DURATION: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "relwatch_page_fetch_duration_seconds",
            "Duration of release page fetches",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
    )
    .unwrap()
});

/// Release entries skipped because the requested quality was missing.
pub static ENTRIES_SKIPPED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "relwatch_entries_skipped_total",
        "Release entries without the requested quality",
    )
    .unwrap()
});

// =============================================================================
// Batch Metrics
// =============================================================================

/// Shows processed by batch runs, by result.
pub static SHOWS_PROCESSED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("relwatch_shows_processed_total", "Total shows checked"),
        &["result"], // "checked", "failed"
    )
    .unwrap()
});

/// New episodes emitted by batch runs.
pub static EPISODES_EMITTED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "relwatch_episodes_emitted_total",
        "Total new episodes emitted",
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(PAGE_FETCHES.clone()),
        Box::new(PAGE_FETCH_DURATION.clone()),
        Box::new(ENTRIES_SKIPPED.clone()),
        Box::new(SHOWS_PROCESSED.clone()),
        Box::new(EPISODES_EMITTED.clone()),
    ]
}

/// Register all core metrics in `registry`.
pub fn register_metrics(registry: &Registry) {
    for metric in all_metrics() {
        // Already-registered collectors are fine when sharing a registry
        let _ = registry.register(metric);
    }
}

/// Encode the global registry in the Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if encoder.encode(&metric_families, &mut buffer).is_err() {
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}
