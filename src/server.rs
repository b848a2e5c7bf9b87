//! HTTP server setup and lifecycle.
//!
//! Configures the axum application with:
//! - The four demo routes behind the request-metrics middleware
//! - Operational endpoints (/metrics, /health, /ready) outside it
//! - Graceful shutdown support

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::{MatchedPath, Request, State};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use opentelemetry_sdk::trace::Tracer;
use prometheus::Registry;
use tokio::sync::watch;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::handlers;
use crate::observability::metrics::HttpMetrics;
use crate::observability::prometheus::{create_ops_router, PrometheusState};

/// Shared state handed to every handler.
///
/// Holds the one tracer manufactured by the process-wide provider and the
/// request aggregates. Cloning is cheap; both members are handles.
#[derive(Clone)]
pub struct AppState {
    pub tracer: Tracer,
    pub metrics: Arc<HttpMetrics>,
}

/// Record request metrics around the inner handler.
///
/// Labels use the matched route template so `/hello?name=x` and `/hello`
/// aggregate under the same series.
pub async fn track_metrics(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    let method = req.method().to_string();
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| req.uri().path().to_string(), |p| p.as_str().to_string());

    state.metrics.on_request_start();
    let start = Instant::now();
    let response = next.run(req).await;
    let elapsed = start.elapsed().as_secs_f64();
    state.metrics.on_request_end();

    state
        .metrics
        .record_request(&method, &route, response.status().as_u16(), elapsed);

    response
}

/// Build the complete application router.
pub fn build_router(state: AppState, registry: Arc<Registry>) -> Router {
    let demo = Router::new()
        .route("/", get(handlers::index))
        .route("/hello", get(handlers::hello))
        .route("/work", get(handlers::work))
        .route("/error", get(handlers::error))
        .route_layer(middleware::from_fn_with_state(state.clone(), track_metrics))
        .with_state(state);

    let ops = create_ops_router(PrometheusState::new(registry));

    demo.merge(ops).layer(TraceLayer::new_for_http())
}

/// Run the Beacon HTTP server.
///
/// # Arguments
///
/// * `config` - Server configuration
/// * `state` - Shared handler state
/// * `registry` - Prometheus registry backing `/metrics`
/// * `shutdown_rx` - Receiver for shutdown signal
///
/// # Returns
///
/// Returns when the server has shut down.
pub async fn run_server(
    config: &Config,
    state: AppState,
    registry: Arc<Registry>,
    mut shutdown_rx: watch::Receiver<bool>,
) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let app = build_router(state, registry);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(address = %addr, "Starting Beacon HTTP server");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.changed().await;
            tracing::info!("Shutdown signal received, stopping server");
        })
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}
