//! Configuration parsing for the Beacon server.
//!
//! Supports:
//! - CLI arguments via clap
//! - Environment variable overrides
//! - Sensible defaults for quick start

use clap::{Parser, ValueEnum};

/// Span export transport, chosen once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExporterKind {
    /// Fire-and-forget JSON datagrams to a local tracing agent over UDP.
    Agent,
    /// gRPC/OTLP delivery to a collector over a persistent connection.
    Collector,
}

/// Beacon: an instrumented demo web service.
#[derive(Parser, Debug, Clone)]
#[command(name = "beacon")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Host address to bind to
    #[arg(long, env = "BEACON_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "BEACON_PORT", default_value_t = 5000)]
    pub port: u16,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,

    /// Span export transport
    #[arg(long, env = "BEACON_EXPORTER", value_enum, default_value = "agent")]
    pub exporter: ExporterKind,

    /// Tracing agent host for UDP span export
    #[arg(long, env = "BEACON_AGENT_HOST", default_value = "127.0.0.1")]
    pub agent_host: String,

    /// Tracing agent port for UDP span export
    #[arg(long, env = "BEACON_AGENT_PORT", default_value_t = 6831)]
    pub agent_port: u16,

    /// Collector host for gRPC/OTLP span export
    #[arg(long, env = "JAEGER_AGENT_HOST", default_value = "jaeger")]
    pub collector_host: String,

    /// Collector port for gRPC/OTLP span export
    #[arg(long, env = "JAEGER_AGENT_PORT", default_value_t = 4317)]
    pub collector_port: u16,
}

impl Config {
    /// Parse configuration from CLI arguments and environment.
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 5000,
            log_level: "info".into(),
            exporter: ExporterKind::Agent,
            agent_host: "127.0.0.1".into(),
            agent_port: 6831,
            collector_host: "jaeger".into(),
            collector_port: 4317,
        }
    }
}
