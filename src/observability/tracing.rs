//! OpenTelemetry tracing setup.
//!
//! Configures:
//! - Console logging with structured format
//! - The process-wide tracer provider with a batch span processor and the
//!   configured export transport

use std::time::Duration;

use anyhow::Context as _;
use opentelemetry::{global, KeyValue};
use opentelemetry_sdk::export::trace::SpanExporter;
use opentelemetry_sdk::trace::{
    BatchConfig, BatchConfigBuilder, BatchSpanProcessor, Config as TraceConfig, TracerProvider,
};
use opentelemetry_sdk::{runtime, Resource};
use opentelemetry_semantic_conventions::resource::{SERVICE_NAME, SERVICE_VERSION};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, ExporterKind};
use crate::observability::exporter::{build_otlp_exporter, AgentSpanExporter};

/// Maximum number of finished spans buffered before export. Once the queue
/// is full the processor drops new spans rather than blocking a request.
const SPAN_QUEUE_SIZE: usize = 2048;

/// How often the batch processor drains its buffer.
const SPAN_EXPORT_DELAY: Duration = Duration::from_secs(5);

/// Maximum number of spans handed to the exporter in one call.
const SPAN_EXPORT_BATCH_SIZE: usize = 512;

/// Initialize logging with the given default level.
///
/// This sets up:
/// - Console logging with structured format
/// - Environment-based filter (via RUST_LOG)
///
/// # Panics
///
/// Panics if a global subscriber has already been installed.
pub fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{log_level},beacon=debug")));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();

    tracing::info!("Logging initialized");
}

/// Initialize tracing for tests (only logs errors).
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("error")
        .with_test_writer()
        .try_init();
}

/// Identity attached to every span this process exports.
fn service_resource() -> Resource {
    Resource::new([
        KeyValue::new(SERVICE_NAME, "beacon"),
        KeyValue::new(SERVICE_VERSION, env!("CARGO_PKG_VERSION")),
    ])
}

/// Build the process-wide tracer provider with the configured exporter.
///
/// The provider is also registered globally so libraries that look up the
/// default tracer source find it; handlers still receive their tracer by
/// injection through [`crate::server::AppState`].
///
/// # Errors
///
/// Fails if the configured export target cannot be set up (unresolvable
/// agent address, invalid collector endpoint). Misconfiguration is fatal at
/// startup rather than discovered at first export.
pub fn build_tracer_provider(config: &Config) -> anyhow::Result<TracerProvider> {
    let provider = match config.exporter {
        ExporterKind::Agent => {
            let exporter = AgentSpanExporter::connect(&config.agent_host, config.agent_port)
                .with_context(|| {
                    format!(
                        "failed to set up UDP agent exporter for {}:{}",
                        config.agent_host, config.agent_port
                    )
                })?;
            tracing::info!(
                host = %config.agent_host,
                port = config.agent_port,
                "Exporting spans to UDP agent"
            );
            build_provider(exporter)
        }
        ExporterKind::Collector => {
            let exporter = build_otlp_exporter(&config.collector_host, config.collector_port)
                .with_context(|| {
                    format!(
                        "failed to set up OTLP collector exporter for {}:{}",
                        config.collector_host, config.collector_port
                    )
                })?;
            tracing::info!(
                host = %config.collector_host,
                port = config.collector_port,
                "Exporting spans to OTLP collector"
            );
            build_provider(exporter)
        }
    };

    global::set_tracer_provider(provider.clone());
    Ok(provider)
}

/// Bind the resource and a batch processor around `exporter`.
fn build_provider<E>(exporter: E) -> TracerProvider
where
    E: SpanExporter + 'static,
{
    let processor = BatchSpanProcessor::builder(exporter, runtime::Tokio)
        .with_batch_config(batch_config())
        .build();

    TracerProvider::builder()
        .with_config(TraceConfig::default().with_resource(service_resource()))
        .with_span_processor(processor)
        .build()
}

fn batch_config() -> BatchConfig {
    BatchConfigBuilder::default()
        .with_max_queue_size(SPAN_QUEUE_SIZE)
        .with_scheduled_delay(SPAN_EXPORT_DELAY)
        .with_max_export_batch_size(SPAN_EXPORT_BATCH_SIZE)
        .build()
}

/// Flush pending spans and shut the provider down.
///
/// Export failures at shutdown are logged, never propagated.
pub fn shutdown_tracing(provider: TracerProvider) {
    if let Err(e) = provider.shutdown() {
        tracing::warn!(error = %e, "Failed to shut down tracer provider");
    }
}
