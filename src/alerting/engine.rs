//! Alert decision engine.
//!
//! # State Machines
//! ```text
//! Failover track:
//!     Quiet → Alerted: snapshot carries a pool transition (emit Failover)
//!     Alerted → Quiet: immediately, one alert per transition
//!
//! High-error-rate track:
//!     Normal → Degraded: rate > threshold AND samples >= floor (emit HighErrorRate)
//!     Degraded → Degraded: cooldown elapsed since last fire (emit heartbeat)
//!     Degraded → Normal: rate <= threshold (emit Recovery)
//! ```
//!
//! # Design Decisions
//! - The engine owns alert state exclusively and only reads window snapshots
//! - Time comes from the snapshot, never the wall clock, so decisions replay
//! - Delivery gating (maintenance) happens outside: state always evolves

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::alerting::types::{
    AlertDetails, AlertIntent, AlertState, ErrorRateState, FailoverState,
};
use crate::config::{AlertConfig, WindowConfig};
use crate::window::WindowSnapshot;

/// Engine tuning.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    pub threshold_pct: f64,
    pub sample_floor: usize,
    pub cooldown: Duration,
}

impl EngineSettings {
    pub fn from_config(alerts: &AlertConfig, window: &WindowConfig) -> Self {
        Self {
            threshold_pct: alerts.error_rate_threshold_pct,
            sample_floor: window.sample_floor(),
            cooldown: Duration::from_millis(alerts.cooldown_ms),
        }
    }
}

/// Minimum spacing between repeated notifications of one condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cooldown {
    period: Duration,
}

impl Cooldown {
    pub fn new(period: Duration) -> Self {
        Self { period }
    }

    /// True when nothing fired yet or `period` has passed since `last`.
    pub fn elapsed(&self, last: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        match last {
            None => true,
            Some(last) => match (now - last).to_std() {
                Ok(since) => since >= self.period,
                Err(_) => false,
            },
        }
    }
}

/// Serializable view of both tracks.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EngineStatus {
    pub failover_state: FailoverState,
    pub failover: AlertState,
    pub failovers_detected: u64,
    pub error_rate_state: ErrorRateState,
    pub high_error_rate: AlertState,
    pub degraded_since: Option<DateTime<Utc>>,
    pub recoveries: u64,
}

/// Consumes window snapshots and emits alert intents.
#[derive(Debug, Clone)]
pub struct AlertEngine {
    settings: EngineSettings,
    cooldown: Cooldown,
    status: EngineStatus,
}

impl AlertEngine {
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            cooldown: Cooldown::new(settings.cooldown),
            settings,
            status: EngineStatus::default(),
        }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn status(&self) -> &EngineStatus {
        &self.status
    }

    /// Evaluate one snapshot. Intents are returned in the order they should be delivered.
    pub fn evaluate(&mut self, snapshot: &WindowSnapshot) -> Vec<AlertIntent> {
        let mut intents = Vec::new();

        if let Some(intent) = self.evaluate_failover(snapshot) {
            intents.push(intent);
        }
        if let Some(intent) = self.evaluate_error_rate(snapshot) {
            intents.push(intent);
        }

        intents
    }

    fn evaluate_failover(&mut self, snapshot: &WindowSnapshot) -> Option<AlertIntent> {
        let transition = snapshot.transition.as_ref()?;

        self.status.failover_state = FailoverState::Alerted;
        self.status.failover.last_fired_at = Some(snapshot.at);
        self.status.failovers_detected += 1;

        tracing::info!(
            from = %transition.from,
            to = %transition.to,
            release = ?transition.release,
            "Failover detected"
        );

        let intent = AlertIntent::new(
            snapshot.at,
            AlertDetails::Failover {
                from: transition.from.clone(),
                to: transition.to.clone(),
                release: transition.release.clone(),
            },
        );

        self.status.failover_state = FailoverState::Quiet;
        Some(intent)
    }

    fn evaluate_error_rate(&mut self, snapshot: &WindowSnapshot) -> Option<AlertIntent> {
        let above = snapshot.error_rate_pct > self.settings.threshold_pct;

        match self.status.error_rate_state {
            ErrorRateState::Normal => {
                if !above || snapshot.sample_count < self.settings.sample_floor {
                    return None;
                }

                self.status.error_rate_state = ErrorRateState::Degraded;
                self.status.high_error_rate.active = true;
                self.status.high_error_rate.last_fired_at = Some(snapshot.at);
                self.status.degraded_since = Some(snapshot.at);

                tracing::warn!(
                    error_rate_pct = snapshot.error_rate_pct,
                    threshold_pct = self.settings.threshold_pct,
                    sample_count = snapshot.sample_count,
                    "Error rate above threshold"
                );
                Some(self.high_error_rate_intent(snapshot, false))
            }
            ErrorRateState::Degraded if !above => {
                let degraded_since = self.status.degraded_since.take();
                self.status.error_rate_state = ErrorRateState::Normal;
                self.status.high_error_rate.active = false;
                self.status.recoveries += 1;

                tracing::info!(
                    error_rate_pct = snapshot.error_rate_pct,
                    threshold_pct = self.settings.threshold_pct,
                    "Error rate recovered"
                );
                Some(AlertIntent::new(
                    snapshot.at,
                    AlertDetails::Recovery {
                        error_rate_pct: snapshot.error_rate_pct,
                        threshold_pct: self.settings.threshold_pct,
                        sample_count: snapshot.sample_count,
                        degraded_since,
                    },
                ))
            }
            ErrorRateState::Degraded => {
                if !self
                    .cooldown
                    .elapsed(self.status.high_error_rate.last_fired_at, snapshot.at)
                {
                    return None;
                }

                self.status.high_error_rate.last_fired_at = Some(snapshot.at);
                tracing::debug!(
                    error_rate_pct = snapshot.error_rate_pct,
                    "Error rate still above threshold, heartbeat due"
                );
                Some(self.high_error_rate_intent(snapshot, true))
            }
        }
    }

    fn high_error_rate_intent(&self, snapshot: &WindowSnapshot, heartbeat: bool) -> AlertIntent {
        AlertIntent::new(
            snapshot.at,
            AlertDetails::HighErrorRate {
                error_rate_pct: snapshot.error_rate_pct,
                threshold_pct: self.settings.threshold_pct,
                error_count: snapshot.error_count,
                sample_count: snapshot.sample_count,
                heartbeat,
                active_pool: snapshot.active_pool.clone(),
            },
        )
    }
}
