//! Metrics collection and exposition.
//!
//! # Metrics
//! - `alertmux_sync_runs_total` (counter): reconciliation passes by outcome
//! - `alertmux_sync_tenant_failures_total` (counter): per-tenant sync failures
//! - `alertmux_apply_total` (counter): save/delete applies by operation, outcome
//! - `alertmux_running_instances` (gauge): instances currently loaded

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint started"),
        Err(e) => tracing::error!(error = %e, "Failed to start metrics endpoint"),
    }
}

pub fn record_sync_run(failures: usize) {
    let outcome = if failures == 0 { "ok" } else { "partial" };
    metrics::counter!("alertmux_sync_runs_total", "outcome" => outcome).increment(1);
    if failures > 0 {
        metrics::counter!("alertmux_sync_tenant_failures_total").increment(failures as u64);
    }
}

pub fn record_apply(operation: &'static str, ok: bool) {
    let outcome = if ok { "ok" } else { "error" };
    metrics::counter!("alertmux_apply_total", "operation" => operation, "outcome" => outcome)
        .increment(1);
}

pub fn set_running_instances(count: usize) {
    metrics::gauge!("alertmux_running_instances").set(count as f64);
}
