//! Prometheus metrics for the cfipd server.
//!
//! Counters cover uploads, clears, API key traffic and the expiry sweep.
//!
//! # Security Note
//!
//! The `/metrics` endpoint is unauthenticated to allow Prometheus scraping.
//! It exposes no filenames, usernames or keys, only aggregate counts, but it
//! should still be network-restricted to the scraper.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use prometheus::{self, Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::{LazyLock, Once};

/// Global Prometheus registry for all metrics.
pub static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

// Upload metrics
pub static UPLOADS_ACCEPTED: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "cfipd_uploads_accepted_total",
            "Total uploads stored, by file kind",
        ),
        &["kind"],
    )
    .expect("metric creation failed")
});

pub static UPLOADS_REJECTED: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "cfipd_uploads_rejected_total",
            "Total uploads refused, by reason",
        ),
        &["reason"],
    )
    .expect("metric creation failed")
});

pub static UPLOAD_BYTES: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new("cfipd_upload_bytes_total", "Total bytes stored by uploads")
        .expect("metric creation failed")
});

pub static SLOT_CLEARS: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new("cfipd_slot_clears_total", "Total clear-files requests")
        .expect("metric creation failed")
});

// API key metrics
pub static API_KEYS_ISSUED: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new("cfipd_api_keys_issued_total", "Total API keys issued")
        .expect("metric creation failed")
});

pub static API_KEY_REJECTIONS: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "cfipd_api_key_rejections_total",
        "Total requests refused for presenting an invalid API key",
    )
    .expect("metric creation failed")
});

// Cleanup metrics
pub static EXPIRED_FILES_REMOVED: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "cfipd_expired_files_removed_total",
        "Total files removed by the expiry sweep",
    )
    .expect("metric creation failed")
});

pub static FILE_DELETE_FAILURES: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "cfipd_file_delete_failures_total",
            "Total per-file deletion failures, by operation",
        ),
        &["operation"],
    )
    .expect("metric creation failed")
});

static REGISTER_ONCE: Once = Once::new();

/// Register all metrics with the global registry.
///
/// This function is idempotent - subsequent calls after the first are no-ops.
/// This allows safe use in integration tests or when embedding multiple routers.
pub fn register_metrics() {
    REGISTER_ONCE.call_once(|| {
        REGISTRY
            .register(Box::new(UPLOADS_ACCEPTED.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(UPLOADS_REJECTED.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(UPLOAD_BYTES.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(SLOT_CLEARS.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(API_KEYS_ISSUED.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(API_KEY_REJECTIONS.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(EXPIRED_FILES_REMOVED.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(FILE_DELETE_FAILURES.clone()))
            .expect("metric registration failed");
    });
}

/// GET /metrics - Prometheus text exposition.
pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();

    let mut buffer = Vec::new();
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(()) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            buffer,
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            [("content-type", "text/plain; charset=utf-8")],
            format!("Failed to encode metrics: {e}").into_bytes(),
        ),
    }
}

/// Helper to record a refused upload by reason.
pub fn record_upload_rejection(reason: &str) {
    UPLOADS_REJECTED.with_label_values(&[reason]).inc();
}

/// Helper to record per-file deletion failures for an operation.
pub fn record_delete_failures(operation: &str, count: usize) {
    if count > 0 {
        FILE_DELETE_FAILURES
            .with_label_values(&[operation])
            .inc_by(count as u64);
    }
}
