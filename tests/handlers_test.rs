//! Contract tests for the demo endpoints.
//!
//! Tests:
//! - Response bodies for /, /hello, /work, /error
//! - /metrics reflects a per-route counter that grows with each request
//! - Aggregates stay exact under concurrent requests
//! - Swapping the span export transport leaves responses unchanged

mod common;

use axum::http::StatusCode;
use common::{get, get_body, get_json, requests_total, test_app};

#[tokio::test]
async fn test_index_returns_welcome_html() {
    let app = test_app();
    let response = get(&app, "/").await;

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get("content-type")
        .expect("content-type header")
        .to_str()
        .expect("header is ascii")
        .to_string();
    assert!(content_type.starts_with("text/html"));

    let (_, body) = get_body(&app, "/").await;
    assert!(body.contains("/hello"));
    assert!(body.contains("/error"));
}

#[tokio::test]
async fn test_hello_defaults_to_devops() {
    let app = test_app();
    let (status, body) = get_body(&app, "/hello").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"message":"Hello, DevOps!"}"#);
}

#[tokio::test]
async fn test_hello_greets_by_name() {
    let app = test_app();
    let (status, json) = get_json(&app, "/hello?name=Ada").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Hello, Ada!");
}

#[tokio::test]
async fn test_work_reports_rounded_delay() {
    let app = test_app();
    let (status, json) = get_json(&app, "/work").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "done");

    let delay = json["delay"].as_f64().expect("delay is a number");
    assert!((0.1..=0.5).contains(&delay), "delay out of range: {delay}");
    // Rounded to exactly three decimal places.
    let thousandths = delay * 1000.0;
    assert!(
        (thousandths - thousandths.round()).abs() < 1e-9,
        "delay not rounded to 3 decimals: {delay}"
    );
}

#[tokio::test]
async fn test_error_returns_500_with_message() {
    let app = test_app();
    let (status, body) = get_body(&app, "/error").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, r#"{"error":"simulated error for tracing"}"#);
}

#[tokio::test]
async fn test_metrics_counter_grows_per_route() {
    let app = test_app();

    let (_, before) = get_body(&app, "/metrics").await;
    let baseline = requests_total(&before, "/hello");

    for _ in 0..3 {
        let (status, _) = get_body(&app, "/hello").await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, after) = get_body(&app, "/metrics").await;
    assert_eq!(requests_total(&after, "/hello"), baseline + 3.0);

    // Two more, same series keeps growing.
    get_body(&app, "/hello").await;
    get_body(&app, "/hello").await;
    let (_, again) = get_body(&app, "/metrics").await;
    assert_eq!(requests_total(&again, "/hello"), baseline + 5.0);
}

#[tokio::test]
async fn test_error_requests_count_under_their_status() {
    let app = test_app();

    get_body(&app, "/error").await;
    let (_, text) = get_body(&app, "/metrics").await;

    let line = text
        .lines()
        .find(|line| line.starts_with("http_requests_total{") && line.contains("route=\"/error\""))
        .expect("series for /error exists");
    assert!(line.contains("status=\"500\""), "unexpected series: {line}");
}

#[tokio::test]
async fn test_scrapes_do_not_count_themselves() {
    let app = test_app();

    get_body(&app, "/metrics").await;
    get_body(&app, "/metrics").await;
    let (_, text) = get_body(&app, "/metrics").await;

    assert_eq!(requests_total(&text, "/metrics"), 0.0);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_concurrent_requests_keep_aggregates_exact() {
    let app = test_app();

    let mut handles = Vec::new();
    for _ in 0..50 {
        let app = app.clone();
        handles.push(tokio::spawn(async move { get_body(&app, "/work").await }));
    }
    for handle in handles {
        let (status, _) = handle.await.expect("task completes");
        assert_eq!(status, StatusCode::OK);
    }

    let (_, text) = get_body(&app, "/metrics").await;
    assert_eq!(requests_total(&text, "/work"), 50.0);
}

/// The telemetry transport is fully decoupled from the request/response
/// contract: an app shipping spans to a UDP agent answers exactly like one
/// keeping spans in memory.
#[tokio::test]
async fn test_exporter_choice_does_not_change_responses() {
    use beacon::observability::exporter::AgentSpanExporter;
    use beacon::observability::metrics::HttpMetrics;
    use beacon::server::{build_router, AppState};
    use opentelemetry::trace::TracerProvider as _;
    use opentelemetry_sdk::trace::TracerProvider;
    use prometheus::Registry;
    use std::net::UdpSocket;
    use std::sync::Arc;

    let sink = UdpSocket::bind("127.0.0.1:0").expect("bind sink");
    let port = sink.local_addr().expect("local addr").port();

    let exporter = AgentSpanExporter::connect("127.0.0.1", port).expect("connect exporter");
    let provider = TracerProvider::builder()
        .with_simple_exporter(exporter)
        .build();
    let registry = Arc::new(Registry::new());
    let state = AppState {
        tracer: provider.tracer("beacon-test"),
        metrics: Arc::new(HttpMetrics::new(&registry).expect("metrics registration")),
    };
    let agent_app = build_router(state, registry);

    let in_memory_app = test_app();

    let (agent_status, agent_body) = get_body(&agent_app, "/hello?name=Grace").await;
    let (mem_status, mem_body) = get_body(&in_memory_app, "/hello?name=Grace").await;
    assert_eq!(agent_status, mem_status);
    assert_eq!(agent_body, mem_body);

    let (agent_status, agent_body) = get_body(&agent_app, "/error").await;
    let (mem_status, mem_body) = get_body(&in_memory_app, "/error").await;
    assert_eq!(agent_status, mem_status);
    assert_eq!(agent_body, mem_body);
}

#[tokio::test]
async fn test_health_and_ready_endpoints() {
    let app = test_app();

    let (status, body) = get_body(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "OK");

    let (status, body) = get_body(&app, "/ready").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "READY");
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let app = test_app();
    let (status, _) = get_body(&app, "/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
