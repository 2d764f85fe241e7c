//! Published view of the watcher state.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::alerting::{AlertKind, EngineStatus};
use crate::probe::ProbeOutcome;
use crate::window::PoolState;

/// How many suppressed alerts are kept for inspection.
pub const SUPPRESSED_HISTORY: usize = 50;

/// Local record of an alert withheld by maintenance mode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuppressedAlert {
    pub id: Uuid,
    pub kind: AlertKind,
    pub at: DateTime<Utc>,
    pub message: String,
}

/// Delivery counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DeliveryCounters {
    pub delivered: u64,
    pub failed: u64,
    pub suppressed: u64,
}

/// Snapshot published after every tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WatcherStatus {
    pub started_at: DateTime<Utc>,
    pub target: String,
    pub ticks: u64,
    pub ticks_skipped: u64,
    /// Maintenance flag as seen by the most recent tick.
    pub maintenance_mode: bool,
    pub pool: PoolState,
    pub error_rate_pct: f64,
    pub error_count: usize,
    pub sample_count: usize,
    pub window_capacity: usize,
    pub alerts: EngineStatus,
    pub deliveries: DeliveryCounters,
    pub last_outcome: Option<ProbeOutcome>,
    pub recent_suppressed: VecDeque<SuppressedAlert>,
}

impl WatcherStatus {
    pub fn new(target: String, window_capacity: usize) -> Self {
        Self {
            started_at: Utc::now(),
            target,
            ticks: 0,
            ticks_skipped: 0,
            maintenance_mode: false,
            pool: PoolState::default(),
            error_rate_pct: 0.0,
            error_count: 0,
            sample_count: 0,
            window_capacity,
            alerts: EngineStatus::default(),
            deliveries: DeliveryCounters::default(),
            last_outcome: None,
            recent_suppressed: VecDeque::new(),
        }
    }

    pub(crate) fn push_suppressed(&mut self, record: SuppressedAlert) {
        if self.recent_suppressed.len() == SUPPRESSED_HISTORY {
            self.recent_suppressed.pop_front();
        }
        self.recent_suppressed.push_back(record);
    }
}
