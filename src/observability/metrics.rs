//! Metrics collection and exposition.
//!
//! # Metrics
//! - `reauth_decisions_total` (counter): gate decisions by outcome
//! - `reauth_backend_calls_total` (counter): backend calls by backend, result
//! - `reauth_backend_duration_seconds` (histogram): backend call latency

use std::net::SocketAddr;
use std::time::Instant;

use ::metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus exporter on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a gate decision.
pub fn record_decision(outcome: &'static str) {
    counter!("reauth_decisions_total", "outcome" => outcome).increment(1);
}

/// Record one backend `authenticate` call.
pub fn record_backend_call(backend: &str, result: &'static str, started: Instant) {
    let backend = backend.to_string();
    counter!("reauth_backend_calls_total", "backend" => backend.clone(), "result" => result).increment(1);
    histogram!("reauth_backend_duration_seconds", "backend" => backend).record(started.elapsed().as_secs_f64());
}
