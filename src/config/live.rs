//! Hot-reloadable runtime settings.
//!
//! Everything else in [`WatcherConfig`](crate::config::WatcherConfig) is fixed at
//! startup. The maintenance flag can be flipped at any time by the config file
//! watcher, SIGHUP, or the admin API, and is read by the monitor as a single
//! snapshot per tick.

use std::sync::Arc;

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Immutable snapshot of the settings that may change at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuntimeSettings {
    /// Alerts are recorded but not delivered while set.
    pub maintenance_mode: bool,
    /// When the flag last changed.
    pub changed_at: DateTime<Utc>,
    /// Who changed it ("startup", "config-reload", "admin-api", ...).
    pub changed_by: String,
}

/// Shared handle over the current [`RuntimeSettings`].
#[derive(Debug)]
pub struct LiveSettings {
    inner: ArcSwap<RuntimeSettings>,
}

impl LiveSettings {
    pub fn new(maintenance_mode: bool) -> Self {
        Self {
            inner: ArcSwap::from_pointee(RuntimeSettings {
                maintenance_mode,
                changed_at: Utc::now(),
                changed_by: "startup".to_string(),
            }),
        }
    }

    /// Take a consistent snapshot. Callers should hold it for a whole decision.
    pub fn snapshot(&self) -> Arc<RuntimeSettings> {
        self.inner.load_full()
    }

    pub fn maintenance_mode(&self) -> bool {
        self.inner.load().maintenance_mode
    }

    /// Set the maintenance flag. Returns true if the value changed.
    pub fn set_maintenance(&self, enabled: bool, source: &str) -> bool {
        let previous = self.inner.rcu(|current| {
            if current.maintenance_mode == enabled {
                Arc::clone(current)
            } else {
                Arc::new(RuntimeSettings {
                    maintenance_mode: enabled,
                    changed_at: Utc::now(),
                    changed_by: source.to_string(),
                })
            }
        });

        let changed = previous.maintenance_mode != enabled;
        if changed {
            tracing::info!(
                maintenance_mode = enabled,
                source = %source,
                "Maintenance mode updated"
            );
        }
        changed
    }
}

impl Default for LiveSettings {
    fn default() -> Self {
        Self::new(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_maintenance_reports_change() {
        let live = LiveSettings::new(false);
        assert!(!live.maintenance_mode());

        assert!(live.set_maintenance(true, "test"));
        assert!(live.maintenance_mode());
        assert_eq!(live.snapshot().changed_by, "test");

        assert!(!live.set_maintenance(true, "again"));
        assert_eq!(live.snapshot().changed_by, "test");
    }

    #[test]
    fn test_snapshot_is_stable_across_updates() {
        let live = LiveSettings::new(false);
        let held = live.snapshot();

        live.set_maintenance(true, "test");

        assert!(!held.maintenance_mode);
        assert!(live.snapshot().maintenance_mode);
    }
}
