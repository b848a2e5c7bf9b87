//! Span export transports.
//!
//! Two interchangeable implementations of the SDK's `SpanExporter`
//! capability:
//! - [`AgentSpanExporter`]: one JSON datagram per span over UDP,
//!   fire-and-forget with no acknowledgement
//! - [`build_otlp_exporter`]: gRPC/OTLP delivery via `opentelemetry-otlp`
//!
//! Selection between the two happens once at startup in
//! [`crate::observability::tracing::build_tracer_provider`], never per
//! request.

use std::net::UdpSocket;
use std::time::{SystemTime, UNIX_EPOCH};

use futures::future::BoxFuture;
use opentelemetry::trace::{Event, Status, TraceError};
use opentelemetry::KeyValue;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::export::trace::{ExportResult, SpanData, SpanExporter};
use serde::Serialize;

/// Build the gRPC/OTLP span exporter for `http://{host}:{port}`.
pub fn build_otlp_exporter(
    host: &str,
    port: u16,
) -> Result<opentelemetry_otlp::SpanExporter, TraceError> {
    opentelemetry_otlp::new_exporter()
        .tonic()
        .with_endpoint(format!("http://{host}:{port}"))
        .build_span_exporter()
}

/// Fire-and-forget UDP span exporter.
///
/// Serializes each finished span to a self-contained JSON datagram and sends
/// it to a local tracing agent. The agent protocol has no acknowledgement,
/// so delivery failures are logged at debug level and otherwise silent;
/// `export` always reports success to the batch processor.
#[derive(Debug)]
pub struct AgentSpanExporter {
    socket: UdpSocket,
}

impl AgentSpanExporter {
    /// Bind a local socket and connect it to the agent target.
    ///
    /// Fails on an unresolvable target so misconfiguration is caught at
    /// startup rather than at first export.
    pub fn connect(host: &str, port: u16) -> std::io::Result<Self> {
        let socket = UdpSocket::bind("0.0.0.0:0")?;
        socket.connect((host, port))?;
        Ok(Self { socket })
    }

    fn send(&self, span: &SpanData) {
        let payload = match serde_json::to_vec(&AgentSpan::from(span)) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::debug!(error = %e, "Failed to encode span for agent export");
                return;
            }
        };
        if let Err(e) = self.socket.send(&payload) {
            tracing::debug!(error = %e, "Failed to send span datagram");
        }
    }
}

impl SpanExporter for AgentSpanExporter {
    fn export(&mut self, batch: Vec<SpanData>) -> BoxFuture<'static, ExportResult> {
        for span in &batch {
            self.send(span);
        }
        Box::pin(futures::future::ready(Ok(())))
    }
}

/// Wire form of one exported span.
#[derive(Debug, Serialize)]
struct AgentSpan {
    trace_id: String,
    span_id: String,
    parent_span_id: String,
    name: String,
    start_time_us: u64,
    end_time_us: u64,
    attributes: Vec<AgentTag>,
    events: Vec<AgentEvent>,
    status: AgentStatus,
}

#[derive(Debug, Serialize)]
struct AgentTag {
    key: String,
    value: String,
}

#[derive(Debug, Serialize)]
struct AgentEvent {
    name: String,
    timestamp_us: u64,
    attributes: Vec<AgentTag>,
}

#[derive(Debug, Serialize)]
struct AgentStatus {
    code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl From<&SpanData> for AgentSpan {
    fn from(span: &SpanData) -> Self {
        Self {
            trace_id: span.span_context.trace_id().to_string(),
            span_id: span.span_context.span_id().to_string(),
            parent_span_id: span.parent_span_id.to_string(),
            name: span.name.to_string(),
            start_time_us: unix_micros(span.start_time),
            end_time_us: unix_micros(span.end_time),
            attributes: span.attributes.iter().map(AgentTag::from).collect(),
            events: span.events.iter().map(AgentEvent::from).collect(),
            status: AgentStatus::from(&span.status),
        }
    }
}

impl From<&KeyValue> for AgentTag {
    fn from(kv: &KeyValue) -> Self {
        Self {
            key: kv.key.to_string(),
            value: kv.value.to_string(),
        }
    }
}

impl From<&Event> for AgentEvent {
    fn from(event: &Event) -> Self {
        Self {
            name: event.name.to_string(),
            timestamp_us: unix_micros(event.timestamp),
            attributes: event.attributes.iter().map(AgentTag::from).collect(),
        }
    }
}

impl From<&Status> for AgentStatus {
    fn from(status: &Status) -> Self {
        match status {
            Status::Unset => Self {
                code: "unset",
                message: None,
            },
            Status::Ok => Self {
                code: "ok",
                message: None,
            },
            Status::Error { description } => Self {
                code: "error",
                message: Some(description.to_string()),
            },
        }
    }
}

fn unix_micros(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_micros() as u64
}
