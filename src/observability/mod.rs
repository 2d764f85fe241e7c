//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! probe, window, monitor, notifier:
//!     → logging.rs (tracing events, pretty or JSON)
//!     → metrics.rs (probe counters, error-rate gauges, alert outcomes)
//!
//! Consumers:
//!     → stdout, picked up by the container log driver
//!     → Prometheus scrape on observability.metrics_address
//! ```
//!
//! # Design Decisions
//! - Every log line about an alert carries its uuid
//! - Metrics are recorded through the `metrics` facade and stay no-ops
//!   until the exporter is installed

pub mod logging;
pub mod metrics;
