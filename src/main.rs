//! Beacon: an instrumented demo web service.
//!
//! # Usage
//!
//! ```bash
//! beacon --port 5000 --exporter agent
//! ```
//!
//! Environment variables can also be used:
//! - `BEACON_PORT`: Port to listen on
//! - `BEACON_EXPORTER`: Span export transport (`agent` or `collector`)
//! - `JAEGER_AGENT_HOST` / `JAEGER_AGENT_PORT`: OTLP collector endpoint
//! - `RUST_LOG`: Log level (trace, debug, info, warn, error)

use std::sync::Arc;

use beacon::config::Config;
use beacon::observability::metrics::HttpMetrics;
use beacon::observability::tracing::{build_tracer_provider, init_tracing, shutdown_tracing};
use beacon::server::{run_server, AppState};
use opentelemetry::trace::TracerProvider as _;
use prometheus::Registry;
use tokio::sync::watch;

/// Print startup banner with version and configuration.
fn print_banner(config: &Config) {
    let version = env!("CARGO_PKG_VERSION");
    eprintln!(
        r"
  Beacon v{} - instrumented demo service

  Configuration:
    Address:    {}:{}
    Exporter:   {:?}
    Log Level:  {}

  Press Ctrl+C to shutdown gracefully.
",
        version, config.host, config.port, config.exporter, config.log_level
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse configuration from CLI arguments and environment
    let config = Config::parse_args();

    // Initialize logging
    init_tracing(&config.log_level);

    // Build the tracer provider with the configured export transport.
    // Misconfiguration is fatal here, before the server starts.
    let provider = build_tracer_provider(&config)?;
    let tracer = provider.tracer("beacon");

    // Set up the Prometheus registry and request metrics
    let registry = Arc::new(Registry::new());
    let metrics = Arc::new(HttpMetrics::new(&registry)?);

    print_banner(&config);

    // Create shutdown signal channel
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Spawn signal handler task
    let shutdown_tx_clone = shutdown_tx.clone();
    tokio::spawn(async move {
        // Wait for SIGTERM or SIGINT (Ctrl+C)
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            let mut sigterm =
                signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");

            tokio::select! {
                _ = ctrl_c => {
                    tracing::info!("Received SIGINT (Ctrl+C), initiating shutdown...");
                }
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM, initiating shutdown...");
                }
            }
        }

        #[cfg(not(unix))]
        {
            ctrl_c.await.expect("failed to listen for ctrl+c");
            tracing::info!("Received Ctrl+C, initiating shutdown...");
        }

        // Signal shutdown
        let _ = shutdown_tx_clone.send(true);
    });

    // Run the server
    let state = AppState { tracer, metrics };
    run_server(&config, state, registry, shutdown_rx).await?;

    // Flush pending spans before exit
    shutdown_tracing(provider);

    tracing::info!("Beacon shutdown complete");
    Ok(())
}
