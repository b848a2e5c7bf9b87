//! Observability infrastructure.
//!
//! Provides:
//! - Structured logging and OpenTelemetry span export
//! - Pluggable span export transports (UDP agent, gRPC/OTLP)
//! - Prometheus request metrics and scrape endpoints

pub mod exporter;
pub mod metrics;
pub mod prometheus;
pub mod tracing;
