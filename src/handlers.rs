//! Demo endpoint handlers.
//!
//! Each handler opens exactly one span via the tracer injected through
//! [`AppState`] and does deliberately trivial work: fabricate latency, echo
//! a query parameter, or fail on purpose. Spans are owned inside the handler
//! scope, so they end on every exit path.

use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, Json};
use opentelemetry::trace::{FutureExt, Span, Status, TraceContextExt, Tracer};
use opentelemetry::{Context, KeyValue};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::server::AppState;

/// Synthetic failure raised by `GET /error` to exercise error recording.
#[derive(Debug, Error)]
#[error("simulated error for tracing")]
pub struct SimulatedError;

/// Query parameters accepted by `GET /hello`.
#[derive(Debug, Deserialize)]
pub struct HelloParams {
    name: Option<String>,
}

/// Body of a `GET /hello` response.
#[derive(Debug, Serialize)]
pub struct HelloResponse {
    message: String,
}

/// Body of a `GET /work` response.
#[derive(Debug, Serialize)]
pub struct WorkResponse {
    status: &'static str,
    delay: f64,
}

/// Body of a `GET /error` response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    error: String,
}

const INDEX_BODY: &str = r#"
<h2>Beacon: axum app with Prometheus metrics & OpenTelemetry traces</h2>
<p>Try <a href="/hello">/hello</a> or <a href="/error">/error</a>.</p>
"#;

/// Handle `GET /` - static welcome page with a little fabricated latency.
pub async fn index(State(state): State<AppState>) -> Html<&'static str> {
    let span = state.tracer.start("index-handler");
    let cx = Context::current_with_span(span);
    async {
        sleep_uniform(0.01, 0.1).await;
        Html(INDEX_BODY)
    }
    .with_context(cx)
    .await
}

/// Handle `GET /hello` - greet the caller by name.
///
/// The name is echoed back and recorded on the span as `app.username`.
pub async fn hello(
    State(state): State<AppState>,
    Query(params): Query<HelloParams>,
) -> Json<HelloResponse> {
    let name = params.name.unwrap_or_else(|| "DevOps".to_string());

    let mut span = state.tracer.start("hello-handler");
    span.set_attribute(KeyValue::new("app.username", name.clone()));

    Json(HelloResponse {
        message: format!("Hello, {name}!"),
    })
}

/// Handle `GET /work` - simulate a unit of work and report its duration.
pub async fn work(State(state): State<AppState>) -> Json<WorkResponse> {
    let span = state.tracer.start("work-handler");
    let cx = Context::current_with_span(span);
    async {
        let delay = sleep_uniform(0.1, 0.5).await;
        Json(WorkResponse {
            status: "done",
            delay: round3(delay),
        })
    }
    .with_context(cx)
    .await
}

/// Handle `GET /error` - fail on purpose.
///
/// The failure is recorded on the span, logged server-side, and surfaced to
/// the caller as a 500 with the message in the body. It never escapes as a
/// panic or an unhandled rejection.
pub async fn error(State(state): State<AppState>) -> (StatusCode, Json<ErrorResponse>) {
    let mut span = state.tracer.start("error-handler");

    let err = SimulatedError;
    span.record_error(&err);
    span.set_status(Status::error(err.to_string()));
    tracing::error!(error = %err, "Simulated failure while handling request");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
}

/// Sleep for a uniformly random duration in `[min_secs, max_secs]` and
/// return the sampled delay in seconds.
async fn sleep_uniform(min_secs: f64, max_secs: f64) -> f64 {
    let delay = rand::thread_rng().gen_range(min_secs..=max_secs);
    tokio::time::sleep(Duration::from_secs_f64(delay)).await;
    delay
}

/// Round to three decimal places, matching the response contract.
fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
