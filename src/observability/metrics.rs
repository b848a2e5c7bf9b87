//! Prometheus request metrics.
//!
//! Key metrics:
//! - http_requests_total: Counter of completed requests by method/route/status
//! - http_request_duration_seconds: Histogram of request latency
//! - http_requests_in_flight: Gauge of requests currently being handled

use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry};

/// Histogram buckets covering the demo handlers' simulated latencies
/// (10ms-500ms) with headroom on both sides.
const DURATION_BUCKETS: &[f64] = &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5];

/// Request aggregates, recorded once per completed request.
///
/// All families are internally synchronized; concurrent handlers may record
/// without additional locking.
#[derive(Debug)]
pub struct HttpMetrics {
    requests_total: IntCounterVec,
    request_duration: HistogramVec,
    in_flight: IntGauge,
}

impl HttpMetrics {
    /// Create the metric families and register them with `registry`.
    ///
    /// # Errors
    ///
    /// Fails if a family with a conflicting name is already registered.
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let requests_total = IntCounterVec::new(
            Opts::new(
                "http_requests_total",
                "Total number of completed HTTP requests",
            ),
            &["method", "route", "status"],
        )?;
        let request_duration = HistogramVec::new(
            HistogramOpts::new(
                "http_request_duration_seconds",
                "HTTP request latency in seconds",
            )
            .buckets(DURATION_BUCKETS.to_vec()),
            &["method", "route", "status"],
        )?;
        let in_flight = IntGauge::new(
            "http_requests_in_flight",
            "Number of requests currently being handled",
        )?;

        registry.register(Box::new(requests_total.clone()))?;
        registry.register(Box::new(request_duration.clone()))?;
        registry.register(Box::new(in_flight.clone()))?;

        Ok(Self {
            requests_total,
            request_duration,
            in_flight,
        })
    }

    /// Record one completed request.
    pub fn record_request(&self, method: &str, route: &str, status: u16, duration_seconds: f64) {
        let status = status.to_string();
        self.requests_total
            .with_label_values(&[method, route, &status])
            .inc();
        self.request_duration
            .with_label_values(&[method, route, &status])
            .observe(duration_seconds);
    }

    /// Mark a request as entering the handler path.
    pub fn on_request_start(&self) {
        self.in_flight.inc();
    }

    /// Mark a request as finished, successfully or not.
    pub fn on_request_end(&self) {
        self.in_flight.dec();
    }
}
