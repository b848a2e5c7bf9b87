//! Beacon: an instrumented demo web service.
//!
//! Beacon exposes a handful of HTTP endpoints whose only purpose is to
//! exercise the observability pipeline: every request is counted and timed
//! for Prometheus, and every handler opens one OpenTelemetry span that is
//! shipped to a collector through a pluggable export transport.
//!
//! # Architecture
//!
//! - **Pluggable span export**: UDP agent datagrams or gRPC/OTLP, selected
//!   once at startup by configuration
//! - **Pull-based metrics**: per-route counters and latency histograms
//!   scraped from `/metrics`
//! - **Injected tracer**: handlers receive their `Tracer` through shared
//!   state rather than a global lookup
//!
//! # Modules
//!
//! - [`config`]: CLI and environment configuration
//! - [`handlers`]: the demo endpoint handlers
//! - [`observability`]: metrics, tracing and exporter setup
//! - [`server`]: HTTP server setup and lifecycle

// Lint configuration
#![warn(clippy::all)]
#![allow(
    clippy::module_name_repetitions, // observability::metrics::HttpMetrics is fine
    clippy::must_use_candidate,      // Not all functions need #[must_use]
    clippy::missing_errors_doc,      // Error docs can be verbose
    clippy::missing_panics_doc       // Panic docs can be verbose
)]

pub mod config;
pub mod handlers;
pub mod observability;
pub mod server;
