//! Metrics collection and exposition.
//!
//! # Metrics
//! - `http_requests_total` (counter): inbound requests by route, method, status
//! - `http_request_duration_seconds` (histogram): inbound latency
//! - `upstream_calls_total` (counter): policy executions by outcome
//! - `circuit_breaker_state` (gauge): 0=closed, 1=open, 2=half-open
//! - `bulkhead_rejections_total` (counter)
//! - `retry_attempts_total` (counter)
//! - `rate_limited_total` (counter)

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(route: &str, method: &str, status: u16, start: Instant) {
    let labels = [
        ("route", route.to_string()),
        ("method", method.to_string()),
        ("status", status.to_string()),
    ];
    counter!("http_requests_total", &labels).increment(1);
    histogram!("http_request_duration_seconds", &labels).record(start.elapsed().as_secs_f64());
}

pub fn record_upstream_call(policy: &str, outcome: &'static str) {
    counter!("upstream_calls_total", "policy" => policy.to_string(), "outcome" => outcome).increment(1);
}

pub fn record_circuit_state(name: &str, state: u8) {
    gauge!("circuit_breaker_state", "name" => name.to_string()).set(f64::from(state));
}

pub fn record_bulkhead_rejected(name: &str) {
    counter!("bulkhead_rejections_total", "name" => name.to_string()).increment(1);
}

pub fn record_retry(name: &str) {
    counter!("retry_attempts_total", "name" => name.to_string()).increment(1);
}

pub fn record_rate_limited(route: &'static str) {
    counter!("rate_limited_total", "route" => route).increment(1);
}
