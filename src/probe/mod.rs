//! Probing subsystem.
//!
//! # Data Flow
//! ```text
//! Periodic tick (monitor)
//!     → http.rs issues one bounded GET against the public endpoint
//!     → response headers → pool / release identity
//!     → classified ProbeOutcome (never an error)
//!     → window subsystem
//! ```
//!
//! # Design Decisions
//! - One outcome per tick, including failures
//! - Probe timeout is strictly below the poll interval (enforced by validation)
//! - 4xx and other non-5xx responses are not failures: the proxy answered
//! - Transport failures are data, not errors: they never cross this boundary

pub mod http;

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

pub use http::HttpProber;

/// Classification of a single probe attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeResult {
    Success,
    ServerError,
    Timeout,
    ConnectionError,
}

impl ProbeResult {
    /// Whether this outcome counts against the error rate.
    pub fn is_error(&self) -> bool {
        !matches!(self, ProbeResult::Success)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProbeResult::Success => "success",
            ProbeResult::ServerError => "server_error",
            ProbeResult::Timeout => "timeout",
            ProbeResult::ConnectionError => "connection_error",
        }
    }
}

impl std::fmt::Display for ProbeResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one probe. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbeOutcome {
    pub timestamp: DateTime<Utc>,
    pub result: ProbeResult,
    pub observed_pool: Option<String>,
    pub observed_release: Option<String>,
    /// HTTP status when a response was received.
    pub status: Option<u16>,
    pub latency: Duration,
}

impl ProbeOutcome {
    /// Outcome for a response that carried a status code.
    pub fn from_response(
        timestamp: DateTime<Utc>,
        status: u16,
        observed_pool: Option<String>,
        observed_release: Option<String>,
        latency: Duration,
    ) -> Self {
        let result = if (500..600).contains(&status) {
            ProbeResult::ServerError
        } else {
            ProbeResult::Success
        };

        Self {
            timestamp,
            result,
            observed_pool,
            observed_release,
            status: Some(status),
            latency,
        }
    }

    /// Outcome for an attempt that received no response.
    pub fn failed(timestamp: DateTime<Utc>, result: ProbeResult, latency: Duration) -> Self {
        Self {
            timestamp,
            result,
            observed_pool: None,
            observed_release: None,
            status: None,
            latency,
        }
    }
}

/// Source of probe outcomes.
///
/// Implementations must be time-bounded and must convert every failure into an
/// outcome rather than returning an error.
#[async_trait]
pub trait Probe: Send + Sync {
    async fn probe(&self) -> ProbeOutcome;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        let now = Utc::now();
        let ok = ProbeOutcome::from_response(now, 200, Some("blue".into()), None, Duration::ZERO);
        assert_eq!(ok.result, ProbeResult::Success);

        let not_found = ProbeOutcome::from_response(now, 404, None, None, Duration::ZERO);
        assert_eq!(not_found.result, ProbeResult::Success);
        assert!(!not_found.result.is_error());

        let bad_gateway =
            ProbeOutcome::from_response(now, 502, Some("green".into()), None, Duration::ZERO);
        assert_eq!(bad_gateway.result, ProbeResult::ServerError);
        assert_eq!(bad_gateway.observed_pool.as_deref(), Some("green"));
    }

    #[test]
    fn test_failed_outcome_has_no_identity() {
        let outcome = ProbeOutcome::failed(Utc::now(), ProbeResult::Timeout, Duration::ZERO);
        assert!(outcome.result.is_error());
        assert!(outcome.observed_pool.is_none());
        assert!(outcome.status.is_none());
    }
}
