//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gate_admissions_total` (counter): decisions by outcome
//! - `gate_audit_writes_total` (counter): persisted records by outcome
//! - `gate_audit_failures_total` (counter): dropped events by stage
//! - `gate_audit_submit_rejected_total` (counter): submissions shed by reason

use std::net::SocketAddr;

use metrics::counter;
use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus exporter on the given address.
///
/// Recording is a no-op until this runs; deployments that leave metrics
/// disabled simply never call it.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => {
            tracing::info!(address = %addr, "Metrics exporter started");
        }
        Err(e) => {
            tracing::error!(address = %addr, error = %e, "Failed to start metrics exporter");
        }
    }
}

/// Record one admission decision (`allowed` or `denied`).
pub fn record_admission(outcome: &'static str) {
    counter!("gate_admissions_total", "outcome" => outcome).increment(1);
}

/// Record one audit record persisted to the store.
pub fn record_audit_write(outcome: &'static str) {
    counter!("gate_audit_writes_total", "outcome" => outcome).increment(1);
}

/// Record one audit event dropped at `stage` (`serialize` or `store`).
pub fn record_audit_failure(stage: &'static str) {
    counter!("gate_audit_failures_total", "stage" => stage).increment(1);
}

/// Record one submission rejected by the queue (`busy` or `closed`).
pub fn record_submit_rejected(reason: &'static str) {
    counter!("gate_audit_submit_rejected_total", "reason" => reason).increment(1);
}
