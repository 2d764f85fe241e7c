//! Metrics collection and exposition.
//!
//! # Metrics
//! - `watcher_probes_total` (counter): probes by result
//! - `watcher_probe_duration_seconds` (histogram): probe latency
//! - `watcher_error_rate_pct` (gauge): rolling window error rate
//! - `watcher_window_samples` (gauge): outcomes currently in the window
//! - `watcher_active_pool` (gauge): 1 for the active pool label, 0 otherwise
//! - `watcher_alerts_total` (counter): alerts by kind and outcome
//! - `watcher_ticks_skipped_total` (counter): ticks dropped due to overlap
//!
//! Recording is a no-op until [`init_metrics`] installs the exporter.

use std::net::SocketAddr;
use std::time::Duration;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::alerting::AlertKind;
use crate::probe::ProbeResult;

/// What happened to an alert intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertOutcome {
    Delivered,
    Failed,
    Suppressed,
}

impl AlertOutcome {
    fn as_str(&self) -> &'static str {
        match self {
            AlertOutcome::Delivered => "delivered",
            AlertOutcome::Failed => "failed",
            AlertOutcome::Suppressed => "suppressed",
        }
    }
}

/// Start the Prometheus scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_probe(result: ProbeResult, latency: Duration) {
    counter!("watcher_probes_total", "result" => result.as_str()).increment(1);
    histogram!("watcher_probe_duration_seconds").record(latency.as_secs_f64());
}

pub fn record_window(error_rate_pct: f64, samples: usize) {
    gauge!("watcher_error_rate_pct").set(error_rate_pct);
    gauge!("watcher_window_samples").set(samples as f64);
}

pub fn record_active_pool(previous: Option<&str>, current: &str) {
    if let Some(previous) = previous {
        gauge!("watcher_active_pool", "pool" => previous.to_string()).set(0.0);
    }
    gauge!("watcher_active_pool", "pool" => current.to_string()).set(1.0);
}

pub fn record_alert(kind: AlertKind, outcome: AlertOutcome) {
    counter!(
        "watcher_alerts_total",
        "kind" => kind.as_str(),
        "outcome" => outcome.as_str()
    )
    .increment(1);
}

pub fn record_ticks_skipped(skipped: u64) {
    counter!("watcher_ticks_skipped_total").increment(skipped);
}
