//! Alert intents and per-track state.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Alert classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AlertKind {
    Failover,
    HighErrorRate,
    Recovery,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::Failover => "failover",
            AlertKind::HighErrorRate => "high_error_rate",
            AlertKind::Recovery => "recovery",
        }
    }
}

impl std::fmt::Display for AlertKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertKind::Failover => write!(f, "Failover"),
            AlertKind::HighErrorRate => write!(f, "HighErrorRate"),
            AlertKind::Recovery => write!(f, "Recovery"),
        }
    }
}

/// Kind-specific alert payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AlertDetails {
    Failover {
        from: String,
        to: String,
        release: Option<String>,
    },
    HighErrorRate {
        error_rate_pct: f64,
        threshold_pct: f64,
        error_count: usize,
        sample_count: usize,
        /// Re-notification of an ongoing condition.
        heartbeat: bool,
        active_pool: Option<String>,
    },
    Recovery {
        error_rate_pct: f64,
        threshold_pct: f64,
        sample_count: usize,
        degraded_since: Option<DateTime<Utc>>,
    },
}

/// Something the engine decided the operator should hear about.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertIntent {
    pub id: Uuid,
    pub kind: AlertKind,
    pub at: DateTime<Utc>,
    pub details: AlertDetails,
}

impl AlertIntent {
    pub fn new(at: DateTime<Utc>, details: AlertDetails) -> Self {
        let kind = match &details {
            AlertDetails::Failover { .. } => AlertKind::Failover,
            AlertDetails::HighErrorRate { .. } => AlertKind::HighErrorRate,
            AlertDetails::Recovery { .. } => AlertKind::Recovery,
        };
        Self {
            id: Uuid::new_v4(),
            kind,
            at,
            details,
        }
    }
}

/// Delivery bookkeeping for one alert kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AlertState {
    pub active: bool,
    pub last_fired_at: Option<DateTime<Utc>>,
}

/// Failover track states. Edge-triggered: `Alerted` is never observed between snapshots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum FailoverState {
    #[default]
    Quiet,
    Alerted,
}

/// High-error-rate track states.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum ErrorRateState {
    #[default]
    Normal,
    Degraded,
}
