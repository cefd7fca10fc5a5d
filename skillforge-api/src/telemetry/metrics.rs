//! Prometheus Metrics Definitions
//!
//! Defines all SkillForge metrics with appropriate labels and types.
//! Exposes a /metrics endpoint for Prometheus scraping.

use axum::{http::StatusCode, response::IntoResponse};
use once_cell::sync::Lazy;
use prometheus::{
    register_counter, register_counter_vec, register_histogram_vec, Counter, CounterVec, Encoder,
    HistogramVec, TextEncoder,
};

use crate::error::{ApiError, ApiResult};

/// HTTP request latency buckets (seconds)
const HTTP_LATENCY_BUCKETS: &[f64] = &[
    0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.0, 2.5, 5.0, 10.0,
];

/// Generator calls take seconds, not milliseconds.
const GENERATOR_LATENCY_BUCKETS: &[f64] = &[0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 20.0, 30.0, 60.0];

/// Global metrics instance - initialized on first use
pub static METRICS: Lazy<ApiResult<SkillForgeMetrics>> = Lazy::new(SkillForgeMetrics::new);

/// Registered metrics, or `None` if registration failed at startup.
pub fn metrics() -> Option<&'static SkillForgeMetrics> {
    METRICS.as_ref().ok()
}

/// Container for all SkillForge metrics.
#[derive(Clone)]
pub struct SkillForgeMetrics {
    /// HTTP request counter - labels: method, path, status
    pub http_requests_total: CounterVec,

    /// HTTP request duration histogram - labels: method, path
    pub http_request_duration_seconds: HistogramVec,

    /// Roadmap generation attempts - labels: status (success/failure)
    pub roadmaps_generated_total: CounterVec,

    /// Tasks newly marked complete
    pub tasks_completed_total: Counter,

    /// Levels gained across all users
    pub level_ups_total: Counter,

    /// Content generator call duration - labels: provider, status
    pub generator_duration_seconds: HistogramVec,
}

impl SkillForgeMetrics {
    /// Create and register all metrics with Prometheus.
    pub fn new() -> ApiResult<Self> {
        let registration = |name: &str, e: prometheus::Error| {
            ApiError::internal_error(format!("Failed to register {}: {}", name, e))
        };

        Ok(Self {
            http_requests_total: register_counter_vec!(
                "skillforge_http_requests_total",
                "Total number of HTTP requests",
                &["method", "path", "status"]
            )
            .map_err(|e| registration("http_requests_total", e))?,

            http_request_duration_seconds: register_histogram_vec!(
                "skillforge_http_request_duration_seconds",
                "HTTP request duration in seconds",
                &["method", "path"],
                HTTP_LATENCY_BUCKETS.to_vec()
            )
            .map_err(|e| registration("http_request_duration_seconds", e))?,

            roadmaps_generated_total: register_counter_vec!(
                "skillforge_roadmaps_generated_total",
                "Roadmap generation attempts",
                &["status"]
            )
            .map_err(|e| registration("roadmaps_generated_total", e))?,

            tasks_completed_total: register_counter!(
                "skillforge_tasks_completed_total",
                "Tasks newly marked complete"
            )
            .map_err(|e| registration("tasks_completed_total", e))?,

            level_ups_total: register_counter!(
                "skillforge_level_ups_total",
                "Levels gained across all users"
            )
            .map_err(|e| registration("level_ups_total", e))?,

            generator_duration_seconds: register_histogram_vec!(
                "skillforge_generator_duration_seconds",
                "Content generator call duration in seconds",
                &["provider", "status"],
                GENERATOR_LATENCY_BUCKETS.to_vec()
            )
            .map_err(|e| registration("generator_duration_seconds", e))?,
        })
    }

    /// Record an HTTP request.
    pub fn record_http_request(&self, method: &str, path: &str, status: u16, duration_secs: f64) {
        let status_str = status.to_string();
        self.http_requests_total
            .with_label_values(&[method, path, &status_str])
            .inc();
        self.http_request_duration_seconds
            .with_label_values(&[method, path])
            .observe(duration_secs);
    }

    /// Record one content generator call and the outcome of the generation.
    pub fn record_generation(&self, provider: &str, success: bool, duration_secs: f64) {
        let status = if success { "success" } else { "failure" };
        self.roadmaps_generated_total
            .with_label_values(&[status])
            .inc();
        self.generator_duration_seconds
            .with_label_values(&[provider, status])
            .observe(duration_secs);
    }

    /// Record a newly completed task and any levels it granted.
    pub fn record_task_completed(&self, levels_gained: u32) {
        self.tasks_completed_total.inc();
        if levels_gained > 0 {
            self.level_ups_total.inc_by(f64::from(levels_gained));
        }
    }
}

/// Handler for GET /metrics endpoint.
///
/// Returns Prometheus text format metrics.
#[utoipa::path(
    get,
    path = "/metrics",
    tag = "Observability",
    responses(
        (status = 200, description = "Prometheus metrics in text format", content_type = "text/plain"),
        (status = 500, description = "Failed to encode metrics"),
    ),
)]
pub async fn metrics_handler() -> impl IntoResponse {
    // Force registration so the families exist even before the first request.
    let _ = metrics();

    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    match encoder.encode(&metric_families, &mut buffer) {
        Ok(_) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            buffer,
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [("content-type", "text/plain")],
                format!("Failed to encode metrics: {}", e).into_bytes(),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prometheus::core::Collector;

    fn registered() -> Result<&'static SkillForgeMetrics, String> {
        METRICS
            .as_ref()
            .map_err(|e| format!("Metrics init failed: {}", e.message))
    }

    #[test]
    fn test_metrics_creation() -> Result<(), String> {
        let metrics = registered()?;
        assert!(!metrics.http_requests_total.desc().is_empty());
        Ok(())
    }

    #[test]
    fn test_record_task_completed_counts_level_ups() -> Result<(), String> {
        let metrics = registered()?;
        let before = metrics.level_ups_total.get();
        metrics.record_task_completed(2);
        metrics.record_task_completed(0);
        assert!(metrics.level_ups_total.get() >= before + 2.0);
        Ok(())
    }

    #[test]
    fn test_record_generation() -> Result<(), String> {
        let metrics = registered()?;
        metrics.record_generation("scripted", true, 0.4);
        metrics.record_generation("scripted", false, 1.2);
        assert!(metrics.roadmaps_generated_total.with_label_values(&["failure"]).get() >= 1.0);
        Ok(())
    }
}
