//! Prometheus metrics
//!
//! The recorder is installed once per process; `/metrics` renders whatever
//! the agent and the HTTP layer have recorded through the `metrics` macros.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

static PROMETHEUS: OnceCell<PrometheusHandle> = OnceCell::new();

/// Install the Prometheus recorder. Returns `None` if installation failed
/// (for example because another recorder is already set).
pub fn init_metrics() -> Option<PrometheusHandle> {
    let handle = PROMETHEUS.get_or_try_init(|| {
        let handle = PrometheusBuilder::new().install_recorder()?;
        describe();
        Ok::<_, metrics_exporter_prometheus::BuildError>(handle)
    });

    match handle {
        Ok(handle) => Some(handle.clone()),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to install Prometheus recorder");
            None
        }
    }
}

fn describe() {
    ::metrics::describe_counter!(
        "figuro_voice_requests_total",
        "Processed voice requests by intent"
    );
    ::metrics::describe_counter!("figuro_voice_errors_total", "Errors by kind");
    ::metrics::describe_histogram!(
        "figuro_voice_stage_latency_seconds",
        ::metrics::Unit::Seconds,
        "Latency of each pipeline stage"
    );
}

/// `GET /metrics`
pub async fn metrics_handler() -> impl IntoResponse {
    match PROMETHEUS.get() {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            "metrics recorder not installed".to_string(),
        ),
    }
}
