//! Prometheus HTTP endpoints for metrics scraping.
//!
//! Provides:
//! - `/metrics` - Prometheus metrics endpoint
//! - `/health` - Basic health check
//! - `/ready` - Readiness check
//!
//! These routes are mounted outside the request-metrics middleware so
//! scrapes do not count themselves.

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Router};
use prometheus::{Encoder, Registry, TextEncoder};
use std::sync::Arc;

/// State for the exposition endpoints.
#[derive(Clone)]
pub struct PrometheusState {
    registry: Arc<Registry>,
}

impl PrometheusState {
    /// Create a new Prometheus state around the shared registry.
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }
}

/// Create the router for the operational endpoints.
pub fn create_ops_router(state: PrometheusState) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler))
        .with_state(state)
}

/// Handle GET /metrics - Prometheus metrics endpoint.
async fn metrics_handler(State(state): State<PrometheusState>) -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = state.registry.gather();

    let mut buffer = Vec::new();
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(()) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            buffer,
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [("content-type", "text/plain; charset=utf-8")],
                format!("Failed to encode metrics: {e}").into_bytes(),
            )
        }
    }
}

/// Handle GET /health - Basic health check.
async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Handle GET /ready - Readiness check.
async fn ready_handler() -> impl IntoResponse {
    (StatusCode::OK, "READY")
}
