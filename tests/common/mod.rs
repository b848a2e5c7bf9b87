//! Test utilities and in-process app harness for Beacon tests.
//!
//! Provides:
//! - Routers wired exactly like the production application
//! - An in-memory span exporter for span assertions
//! - Request/response helpers

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::testing::trace::InMemorySpanExporter;
use opentelemetry_sdk::trace::TracerProvider;
use prometheus::Registry;
use tower::ServiceExt;

use beacon::observability::metrics::HttpMetrics;
use beacon::server::{build_router, AppState};

/// Build an app whose spans stay in-process, for plain HTTP behavior tests.
#[allow(dead_code)]
pub fn test_app() -> Router {
    let (app, _exporter) = test_app_with_spans();
    app
}

/// Build an app wired to an in-memory span exporter.
///
/// Uses a simple (synchronous) span processor, so finished spans are
/// visible to assertions as soon as the response is produced, without
/// flushing.
pub fn test_app_with_spans() -> (Router, InMemorySpanExporter) {
    beacon::observability::tracing::init_test_tracing();

    let exporter = InMemorySpanExporter::default();
    let provider = TracerProvider::builder()
        .with_simple_exporter(exporter.clone())
        .build();
    let tracer = provider.tracer("beacon-test");

    let registry = Arc::new(Registry::new());
    let metrics = Arc::new(HttpMetrics::new(&registry).expect("metrics registration"));

    let state = AppState { tracer, metrics };
    (build_router(state, registry), exporter)
}

/// Issue a GET request against a clone of `app` and return the response.
pub async fn get(app: &Router, uri: &str) -> axum::response::Response {
    app.clone()
        .oneshot(
            Request::builder()
                .uri(uri)
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("request is handled")
}

/// Issue a GET request and return status plus the raw body.
pub async fn get_body(app: &Router, uri: &str) -> (StatusCode, String) {
    let response = get(app, uri).await;
    let status = response.status();
    let body = response
        .into_body()
        .collect()
        .await
        .expect("body collects")
        .to_bytes();
    (status, String::from_utf8_lossy(&body).into_owned())
}

/// Issue a GET request and parse the body as JSON.
#[allow(dead_code)]
pub async fn get_json(app: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let (status, body) = get_body(app, uri).await;
    let json = serde_json::from_str(&body).expect("body is valid JSON");
    (status, json)
}

/// Read the current value of `http_requests_total` for one route from the
/// exposition text, or 0 if the series does not exist yet.
#[allow(dead_code)]
pub fn requests_total(metrics_text: &str, route: &str) -> f64 {
    metrics_text
        .lines()
        .filter(|line| line.starts_with("http_requests_total{"))
        .filter(|line| line.contains(&format!("route=\"{route}\"")))
        .filter_map(|line| line.rsplit(' ').next())
        .filter_map(|value| value.parse::<f64>().ok())
        .sum()
}
