//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_admin_exports_total` (counter): exports by kind, outcome
//! - `gateway_admin_imports_total` (counter): imports by outcome
//! - `gateway_admin_exported_variables` (histogram): variables per bundle
//! - `gateway_admin_export_duration_seconds` (histogram): export latency
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   exporter every call is a no-op, so tests need no setup

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// What an export produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    OpenApi,
    Bundle,
}

impl ExportKind {
    fn label(&self) -> &'static str {
        match self {
            ExportKind::OpenApi => "openapi",
            ExportKind::Bundle => "bundle",
        }
    }
}

fn outcome(ok: bool) -> &'static str {
    if ok {
        "ok"
    } else {
        "error"
    }
}

/// Install the Prometheus exporter on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Prometheus metrics exporter listening"),
        Err(e) => tracing::warn!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_export(kind: ExportKind, ok: bool, started: Instant) {
    counter!(
        "gateway_admin_exports_total",
        "kind" => kind.label(),
        "outcome" => outcome(ok)
    )
    .increment(1);
    histogram!("gateway_admin_export_duration_seconds", "kind" => kind.label())
        .record(started.elapsed().as_secs_f64());
}

pub fn record_exported_variables(count: usize) {
    histogram!("gateway_admin_exported_variables").record(count as f64);
}

pub fn record_import(ok: bool) {
    counter!("gateway_admin_imports_total", "outcome" => outcome(ok)).increment(1);
}
