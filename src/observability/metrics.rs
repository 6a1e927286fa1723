//! Metrics collection and exposition.
//!
//! # Metrics
//! - `static_host_requests_total` (counter): requests by outcome, status
//! - `static_host_request_duration_seconds` (histogram): latency by outcome
//! - `static_host_alias_lookups_total` (counter): alias lookups by result
//!
//! Recording is a no-op until [`init_metrics`] installs the exporter.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter with an HTTP scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a finished site request.
pub fn record_request(outcome: &'static str, status: u16, start: Instant) {
    metrics::counter!(
        "static_host_requests_total",
        "outcome" => outcome,
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("static_host_request_duration_seconds", "outcome" => outcome)
        .record(start.elapsed().as_secs_f64());
}

/// Record an alias lookup against the metadata store.
pub fn record_alias_lookup(result: &'static str) {
    metrics::counter!("static_host_alias_lookups_total", "result" => result).increment(1);
}
