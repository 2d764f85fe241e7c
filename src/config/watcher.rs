//! Configuration file watcher for hot reload.

use std::path::{Path, PathBuf};
use std::time::Duration;
use notify::{Watcher, RecursiveMode, Event, RecommendedWatcher, Config};
use tokio::sync::mpsc;
use crate::config::live::LiveSettings;
use crate::config::loader::reload_config;
use crate::config::schema::WatcherConfig;

/// A watcher that monitors the configuration file for changes.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<WatcherConfig>,
}

impl ConfigWatcher {
    /// Create a new ConfigWatcher.
    ///
    /// Returns the watcher and a receiver for configuration updates.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<WatcherConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (Self {
            path: path.to_path_buf(),
            update_tx,
        }, update_rx)
    }

    /// A sender that feeds the same update stream (used by SIGHUP reloads).
    pub fn sender(&self) -> mpsc::UnboundedSender<WatcherConfig> {
        self.update_tx.clone()
    }

    /// Start watching the file in a background thread.
    ///
    /// The returned handle must be kept alive for as long as watching should continue.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.update_tx.clone();
        let path = self.path.clone();

        let mut watcher = RecommendedWatcher::new(move |res: notify::Result<Event>| {
            match res {
                Ok(event) => {
                    if event.kind.is_modify() || event.kind.is_create() {
                        tracing::info!("Config file change detected, reloading...");
                        reload_into(&path, &tx);
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            }
        }, Config::default().with_poll_interval(Duration::from_secs(2)))?;

        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Config watcher started");
        Ok(watcher)
    }
}

/// Load the file and forward it, keeping the current config on failure.
pub fn reload_into(path: &Path, tx: &mpsc::UnboundedSender<WatcherConfig>) {
    match reload_config(path) {
        Ok(new_config) => {
            let _ = tx.send(new_config);
        }
        Err(e) => {
            tracing::error!("Failed to reload config: {}. Keeping current configuration.", e);
        }
    }
}

/// Tracks reloads against the configuration the process started with.
///
/// Only the maintenance flag is live. Restart-required sections are compared
/// with the running config, so an edit keeps being reported on every reload
/// until the process restarts. The flag is compared with the previous file
/// contents, so a toggle made through the admin API survives unrelated edits.
#[derive(Debug, Clone)]
pub struct ReloadState {
    running: WatcherConfig,
    last_maintenance: bool,
}

impl ReloadState {
    pub fn new(running: WatcherConfig) -> Self {
        Self {
            last_maintenance: running.alerts.maintenance_mode,
            running,
        }
    }

    /// Sections of `reloaded` that differ from the running config.
    pub fn restart_required(&self, reloaded: &WatcherConfig) -> Vec<&'static str> {
        let running = &self.running;
        let mut sections = Vec::new();
        if running.target != reloaded.target {
            sections.push("target");
        }
        if running.polling != reloaded.polling {
            sections.push("polling");
        }
        if running.window != reloaded.window {
            sections.push("window");
        }
        if running.alerts.error_rate_threshold_pct != reloaded.alerts.error_rate_threshold_pct
            || running.alerts.cooldown_ms != reloaded.alerts.cooldown_ms
        {
            sections.push("alerts");
        }
        if running.notifier != reloaded.notifier {
            sections.push("notifier");
        }
        if running.admin != reloaded.admin {
            sections.push("admin");
        }
        if running.observability != reloaded.observability {
            sections.push("observability");
        }
        if running.lifecycle != reloaded.lifecycle {
            sections.push("lifecycle");
        }
        sections
    }

    /// Apply a reloaded configuration. Returns true if the live flag changed.
    pub fn apply(&mut self, live: &LiveSettings, reloaded: &WatcherConfig) -> bool {
        let sections = self.restart_required(reloaded);
        if !sections.is_empty() {
            tracing::warn!(
                sections = ?sections,
                "Config sections differ from the running config and only take effect after restart"
            );
        }

        let maintenance = reloaded.alerts.maintenance_mode;
        if maintenance == self.last_maintenance {
            return false;
        }
        self.last_maintenance = maintenance;
        live.set_maintenance(maintenance, "config-reload")
    }
}
