//! Active pool tracking.
//!
//! # State Transitions
//! ```text
//! (no pool) → baseline: first probe carrying a pool identity, no transition
//! active A  → active B: `corroboration` consecutive identified probes report B
//! ```
//!
//! # Design Decisions
//! - Probes without a pool identity (timeouts, refused connections, missing
//!   header) are ignored: they neither confirm nor reset a pending candidate
//! - A probe reporting the current active pool resets the candidate
//! - A different candidate restarts the count

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Observed topology.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PoolState {
    pub current_active_pool: Option<String>,
    pub last_transition_at: Option<DateTime<Utc>>,
    /// Release id last reported by the active pool.
    pub active_release: Option<String>,
}

/// A corroborated change of the active pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolTransition {
    pub from: String,
    pub to: String,
    pub at: DateTime<Utc>,
    pub release: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Candidate {
    pool: String,
    release: Option<String>,
    seen: usize,
}

/// Detects active pool transitions from a stream of observed identities.
#[derive(Debug, Clone)]
pub struct PoolTracker {
    state: PoolState,
    corroboration: usize,
    candidate: Option<Candidate>,
}

impl PoolTracker {
    /// `corroboration` is the number of consecutive agreeing probes (min 1).
    pub fn new(corroboration: usize) -> Self {
        Self {
            state: PoolState::default(),
            corroboration: corroboration.max(1),
            candidate: None,
        }
    }

    pub fn state(&self) -> &PoolState {
        &self.state
    }

    /// Pool currently accumulating corroboration, with its count.
    pub fn pending(&self) -> Option<(&str, usize)> {
        self.candidate.as_ref().map(|c| (c.pool.as_str(), c.seen))
    }

    /// Feed one observation. Returns a transition when one is confirmed.
    pub fn observe(
        &mut self,
        pool: Option<&str>,
        release: Option<&str>,
        at: DateTime<Utc>,
    ) -> Option<PoolTransition> {
        let pool = pool?;

        let active = match &self.state.current_active_pool {
            None => {
                tracing::info!(pool = %pool, release = ?release, "Baseline established");
                self.state.current_active_pool = Some(pool.to_string());
                self.state.active_release = release.map(str::to_string);
                return None;
            }
            Some(active) => active.clone(),
        };

        if pool == active {
            if self.candidate.take().is_some() {
                tracing::debug!(pool = %pool, "Pending pool change not corroborated");
            }
            if let Some(release) = release {
                self.state.active_release = Some(release.to_string());
            }
            return None;
        }

        let candidate = match self.candidate.take() {
            Some(mut c) if c.pool == pool => {
                c.seen += 1;
                if release.is_some() {
                    c.release = release.map(str::to_string);
                }
                c
            }
            _ => Candidate {
                pool: pool.to_string(),
                release: release.map(str::to_string),
                seen: 1,
            },
        };

        if candidate.seen < self.corroboration {
            tracing::debug!(
                active = %active,
                candidate = %candidate.pool,
                seen = candidate.seen,
                required = self.corroboration,
                "Pool change pending corroboration"
            );
            self.candidate = Some(candidate);
            return None;
        }

        self.state.current_active_pool = Some(candidate.pool.clone());
        self.state.last_transition_at = Some(at);
        self.state.active_release = candidate.release.clone();

        Some(PoolTransition {
            from: active,
            to: candidate.pool,
            at,
            release: candidate.release,
        })
    }
}
