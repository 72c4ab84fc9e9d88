//! Prometheus metrics for the Locker server.
//!
//! The `/metrics` endpoint is unauthenticated to allow Prometheus scraping
//! and is only mounted when `server.metrics_enabled` is set. Restrict it to
//! scraper IPs at the infrastructure level; do not expose it publicly.

use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use prometheus::{self, Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::{LazyLock, Once};

/// Global Prometheus registry for all metrics.
pub static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

pub static HTTP_REQUESTS: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "locker_http_requests_total",
            "Total HTTP requests by method and status",
        ),
        &["method", "status"],
    )
    .expect("metric creation failed")
});

pub static SESSIONS_ISSUED: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "locker_sessions_issued_total",
        "Total number of session tokens issued",
    )
    .expect("metric creation failed")
});

pub static FILES_UPLOADED: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "locker_files_uploaded_total",
        "Total number of files uploaded",
    )
    .expect("metric creation failed")
});

pub static UPLOAD_BYTES: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new("locker_upload_bytes_total", "Total bytes uploaded")
        .expect("metric creation failed")
});

pub static RATE_LIMITED_REQUESTS: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "locker_rate_limited_requests_total",
        "Total number of requests rejected by the rate limiter",
    )
    .expect("metric creation failed")
});

pub static SCAN_PAGES_FETCHED: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "locker_scan_pages_fetched_total",
            "Total number of listing pages fetched from storage by operation",
        ),
        &["operation"],
    )
    .expect("metric creation failed")
});

/// Guard to ensure metrics are only registered once.
static REGISTER_ONCE: Once = Once::new();

/// Register all metrics with the global registry.
///
/// This function is idempotent - subsequent calls after the first are no-ops.
/// This allows safe use in integration tests or when embedding multiple routers.
pub fn register_metrics() {
    REGISTER_ONCE.call_once(|| {
        REGISTRY
            .register(Box::new(HTTP_REQUESTS.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(SESSIONS_ISSUED.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(FILES_UPLOADED.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(UPLOAD_BYTES.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(RATE_LIMITED_REQUESTS.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(SCAN_PAGES_FETCHED.clone()))
            .expect("metric registration failed");
    });
}

/// GET /metrics - Prometheus metrics endpoint.
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

/// Middleware counting every request by method and response status.
pub async fn track_requests(req: Request, next: Next) -> Response {
    let method = req.method().to_string();
    let response = next.run(req).await;
    HTTP_REQUESTS
        .with_label_values(&[&method, response.status().as_str()])
        .inc();
    response
}
