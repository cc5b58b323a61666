//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define gateway metrics (requests, latency, provider calls)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by endpoint, status
//! - `gateway_request_duration_seconds` (histogram): latency by endpoint
//! - `gateway_errors_total` (counter): failed calls by endpoint, error kind
//! - `gateway_upstream_requests_total` (counter): provider calls by operation, outcome
//! - `gateway_upstream_duration_seconds` (histogram): provider latency by operation
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed, so tests need no setup
//! - Labels are static strings; no user input ends up in a label

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and start its scrape listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Record a completed inbound request.
pub fn record_request(endpoint: &'static str, status: u16, start: Instant) {
    metrics::counter!(
        "gateway_requests_total",
        "endpoint" => endpoint,
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("gateway_request_duration_seconds", "endpoint" => endpoint)
        .record(start.elapsed().as_secs_f64());
}

/// Record a call that ended in an error envelope.
pub fn record_error(endpoint: &'static str, kind: &'static str) {
    metrics::counter!("gateway_errors_total", "endpoint" => endpoint, "kind" => kind).increment(1);
}

/// Record a provider call and how it ended.
pub fn record_upstream(operation: &'static str, outcome: &'static str, start: Instant) {
    metrics::counter!(
        "gateway_upstream_requests_total",
        "operation" => operation,
        "outcome" => outcome
    )
    .increment(1);
    metrics::histogram!("gateway_upstream_duration_seconds", "operation" => operation)
        .record(start.elapsed().as_secs_f64());
}
