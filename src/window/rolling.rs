//! Fixed-capacity ring of recent probe outcomes.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::probe::ProbeOutcome;
use crate::window::pool::{PoolState, PoolTracker, PoolTransition};

/// Derived metrics after one recorded outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowSnapshot {
    /// Timestamp of the outcome that produced this snapshot.
    pub at: DateTime<Utc>,
    pub error_rate_pct: f64,
    pub error_count: usize,
    pub sample_count: usize,
    pub capacity: usize,
    pub active_pool: Option<String>,
    pub active_release: Option<String>,
    /// Set when this outcome confirmed a pool change.
    pub transition: Option<PoolTransition>,
}

impl WindowSnapshot {
    pub fn transitioned(&self) -> bool {
        self.transition.is_some()
    }
}

/// Rolling window over the last `capacity` outcomes, plus the pool tracker.
///
/// Pure state: no I/O and no knowledge of alerting.
#[derive(Debug, Clone)]
pub struct RollingWindow {
    capacity: usize,
    outcomes: VecDeque<ProbeOutcome>,
    error_count: usize,
    pool: PoolTracker,
}

impl RollingWindow {
    /// `capacity` is clamped to at least one slot.
    pub fn new(capacity: usize, corroboration: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            outcomes: VecDeque::with_capacity(capacity),
            error_count: 0,
            pool: PoolTracker::new(corroboration),
        }
    }

    /// Append an outcome, evicting the oldest at capacity, and recompute.
    pub fn record_outcome(&mut self, outcome: ProbeOutcome) -> WindowSnapshot {
        if self.outcomes.len() == self.capacity {
            if let Some(evicted) = self.outcomes.pop_front() {
                if evicted.result.is_error() {
                    self.error_count -= 1;
                }
            }
        }

        let at = outcome.timestamp;
        let transition = self.pool.observe(
            outcome.observed_pool.as_deref(),
            outcome.observed_release.as_deref(),
            at,
        );

        if outcome.result.is_error() {
            self.error_count += 1;
        }
        self.outcomes.push_back(outcome);

        let state = self.pool.state();
        WindowSnapshot {
            at,
            error_rate_pct: self.error_rate_pct(),
            error_count: self.error_count,
            sample_count: self.outcomes.len(),
            capacity: self.capacity,
            active_pool: state.current_active_pool.clone(),
            active_release: state.active_release.clone(),
            transition,
        }
    }

    /// Percentage of error outcomes. 0 on an empty window.
    pub fn error_rate_pct(&self) -> f64 {
        if self.outcomes.is_empty() {
            return 0.0;
        }
        (self.error_count as f64 / self.outcomes.len() as f64) * 100.0
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn pool_state(&self) -> &PoolState {
        self.pool.state()
    }

    /// Oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &ProbeOutcome> {
        self.outcomes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::ProbeResult;
    use chrono::Duration as ChronoDuration;
    use std::time::Duration;

    fn outcome(seq: i64, result: ProbeResult, pool: Option<&str>) -> ProbeOutcome {
        ProbeOutcome {
            timestamp: DateTime::<Utc>::UNIX_EPOCH + ChronoDuration::seconds(seq),
            result,
            observed_pool: pool.map(str::to_string),
            observed_release: None,
            status: None,
            latency: Duration::ZERO,
        }
    }

    #[test]
    fn test_empty_window_rate_is_zero() {
        let window = RollingWindow::new(200, 2);
        assert_eq!(window.error_rate_pct(), 0.0);
        assert!(window.is_empty());
    }

    #[test]
    fn test_size_never_exceeds_capacity_and_evicts_fifo() {
        let mut window = RollingWindow::new(5, 2);
        for seq in 0..12 {
            let snapshot = window.record_outcome(outcome(seq, ProbeResult::Success, Some("blue")));
            assert!(snapshot.sample_count <= 5);
        }

        let timestamps: Vec<i64> = window.iter().map(|o| o.timestamp.timestamp()).collect();
        assert_eq!(timestamps, vec![7, 8, 9, 10, 11]);
    }

    #[test]
    fn test_error_rate_two_and_a_half_percent() {
        let mut window = RollingWindow::new(200, 2);
        let mut last = None;
        for seq in 0..200 {
            let result = if seq % 40 == 0 {
                ProbeResult::ServerError
            } else {
                ProbeResult::Success
            };
            last = Some(window.record_outcome(outcome(seq, result, Some("blue"))));
        }

        let snapshot = last.unwrap();
        assert_eq!(snapshot.error_count, 5);
        assert_eq!(snapshot.sample_count, 200);
        assert!((snapshot.error_rate_pct - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_evicted_errors_leave_the_rate() {
        let mut window = RollingWindow::new(4, 2);
        window.record_outcome(outcome(0, ProbeResult::Timeout, None));
        window.record_outcome(outcome(1, ProbeResult::ConnectionError, None));
        assert_eq!(window.error_rate_pct(), 100.0);

        for seq in 2..6 {
            window.record_outcome(outcome(seq, ProbeResult::Success, Some("blue")));
        }
        assert_eq!(window.error_count(), 0);
        assert_eq!(window.error_rate_pct(), 0.0);
    }

    #[test]
    fn test_snapshot_reports_transition() {
        let mut window = RollingWindow::new(10, 2);
        window.record_outcome(outcome(0, ProbeResult::Success, Some("blue")));
        let first = window.record_outcome(outcome(1, ProbeResult::Success, Some("green")));
        assert!(!first.transitioned());
        assert_eq!(first.active_pool.as_deref(), Some("blue"));

        let second = window.record_outcome(outcome(2, ProbeResult::Success, Some("green")));
        assert!(second.transitioned());
        assert_eq!(second.active_pool.as_deref(), Some("green"));
        assert_eq!(window.pool_state().last_transition_at, Some(second.at));
    }
}
