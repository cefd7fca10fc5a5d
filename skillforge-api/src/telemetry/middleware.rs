//! Axum Middleware for HTTP Request Tracing and Metrics
//!
//! Wraps every request in an `http_request` span, logs its completion and
//! records Prometheus metrics.

use axum::{extract::Request, middleware::Next, response::Response};
use once_cell::sync::Lazy;
use regex::Regex;
use std::time::Instant;
use tracing::{info_span, Instrument};

use super::metrics::metrics;

static UUID_PATTERN: Lazy<Result<Regex, regex::Error>> = Lazy::new(|| {
    Regex::new(r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}")
});

static NUMERIC_ID_PATTERN: Lazy<Result<Regex, regex::Error>> =
    Lazy::new(|| Regex::new(r"/\d+(/|$)"));

/// Normalize path for metrics/spans (replace UUIDs and IDs with placeholders).
///
/// Keeps Prometheus label cardinality bounded.
fn normalize_path(path: &str) -> String {
    let mut result = path.to_string();
    if let Ok(uuid) = UUID_PATTERN.as_ref() {
        result = uuid.replace_all(&result, "{id}").into_owned();
    }
    if let Ok(numeric) = NUMERIC_ID_PATTERN.as_ref() {
        result = numeric.replace_all(&result, "/{id}$1").into_owned();
    }
    result
}

/// Observability middleware for Axum.
pub async fn observability_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();

    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let normalized_path = normalize_path(&path);

    let span = info_span!(
        "http_request",
        http.method = %method,
        http.target = %path,
        http.route = %normalized_path,
    );

    let response = next.run(request).instrument(span).await;

    let duration = start.elapsed();
    let status = response.status();

    if let Some(metrics) = metrics() {
        metrics.record_http_request(
            method.as_str(),
            &normalized_path,
            status.as_u16(),
            duration.as_secs_f64(),
        );
    }

    if status.is_server_error() {
        tracing::warn!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            duration_ms = duration.as_millis(),
            "Request failed"
        );
    } else {
        tracing::info!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            duration_ms = duration.as_millis(),
            "Request completed"
        );
    }

    response
}
