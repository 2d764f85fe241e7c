//! The watcher run loop.
//!
//! # Responsibilities
//! - Drive the prober on a fixed cadence, skipping ticks that overlap
//! - Push each outcome through window → engine → maintenance gate → notifier
//! - Publish a [`WatcherStatus`] after every tick
//! - Stop between ticks on shutdown; a delivery cut short by shutdown is
//!   recorded as failed and the status is still published

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, watch};
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::alerting::{AlertEngine, AlertIntent, EngineSettings};
use crate::config::{LiveSettings, RuntimeSettings, WatcherConfig};
use crate::monitor::status::{SuppressedAlert, WatcherStatus};
use crate::notifier::{message, Notifier};
use crate::observability::metrics::{self, AlertOutcome};
use crate::probe::{Probe, ProbeOutcome};
use crate::window::{RollingWindow, WindowSnapshot};

/// What happened to one alert intent during a tick.
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatch {
    pub alert: AlertIntent,
    pub outcome: AlertOutcome,
}

/// Result of processing one outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub snapshot: WindowSnapshot,
    pub dispatches: Vec<Dispatch>,
}

/// Owns every stage of the pipeline. Single logical thread of control.
pub struct Watcher {
    probe: Arc<dyn Probe>,
    notifier: Arc<dyn Notifier>,
    live: Arc<LiveSettings>,
    window: RollingWindow,
    engine: AlertEngine,
    poll_interval: Duration,
    delivery_timeout: Duration,
    stats_log_every: u64,
    status: WatcherStatus,
    status_tx: watch::Sender<WatcherStatus>,
    /// Watched during delivery. Only set while `run` drives the loop.
    shutdown: Option<broadcast::Receiver<()>>,
    stopping: bool,
}

impl Watcher {
    pub fn new(
        config: &WatcherConfig,
        probe: Arc<dyn Probe>,
        notifier: Arc<dyn Notifier>,
        live: Arc<LiveSettings>,
    ) -> Self {
        let window = RollingWindow::new(config.window.size, config.window.corroboration);
        let engine = AlertEngine::new(EngineSettings::from_config(&config.alerts, &config.window));
        let status = WatcherStatus::new(config.target.url.clone(), window.capacity());
        let (status_tx, _) = watch::channel(status.clone());

        Self {
            probe,
            notifier,
            live,
            window,
            engine,
            poll_interval: Duration::from_millis(config.polling.interval_ms),
            delivery_timeout: Duration::from_millis(config.notifier.timeout_ms),
            stats_log_every: config.polling.stats_log_every,
            status,
            status_tx,
            shutdown: None,
            stopping: false,
        }
    }

    /// Receive the status published after each tick.
    pub fn subscribe(&self) -> watch::Receiver<WatcherStatus> {
        self.status_tx.subscribe()
    }

    pub fn status(&self) -> &WatcherStatus {
        &self.status
    }

    pub fn engine(&self) -> &AlertEngine {
        &self.engine
    }

    pub fn window(&self) -> &RollingWindow {
        &self.window
    }

    /// Run until a shutdown signal arrives. An in-flight tick always completes;
    /// deliveries still pending when the signal arrives are abandoned and
    /// counted as failed.
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) {
        self.shutdown = Some(shutdown.resubscribe());

        tracing::info!(
            target_url = %self.status.target,
            interval_ms = self.poll_interval.as_millis() as u64,
            window_size = self.window.capacity(),
            threshold_pct = self.engine.settings().threshold_pct,
            sample_floor = self.engine.settings().sample_floor,
            cooldown_secs = self.engine.settings().cooldown.as_secs(),
            notifier = self.notifier.name(),
            maintenance_mode = self.live.maintenance_mode(),
            "Watcher starting"
        );

        let mut ticker = time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut last_scheduled: Option<Instant> = None;

        loop {
            tokio::select! {
                biased;
                _ = shutdown.recv() => {
                    tracing::info!("Watcher received shutdown signal, exiting loop");
                    break;
                }
                scheduled = ticker.tick() => {
                    if let Some(previous) = last_scheduled {
                        self.note_skipped(scheduled.duration_since(previous));
                    }
                    last_scheduled = Some(scheduled);
                    self.tick().await;
                    if self.stopping {
                        tracing::info!("Watcher stopping after interrupted delivery");
                        break;
                    }
                }
            }
        }

        tracing::info!(ticks = self.status.ticks, "Watcher stopped");
    }

    fn note_skipped(&mut self, gap: Duration) {
        let period = self.poll_interval.as_nanos().max(1);
        let skipped = (gap.as_nanos() / period).saturating_sub(1) as u64;
        if skipped > 0 {
            tracing::debug!(skipped, "Previous tick overran, skipped ticks");
            self.status.ticks_skipped += skipped;
            metrics::record_ticks_skipped(skipped);
        }
    }

    /// Probe once and process the outcome.
    pub async fn tick(&mut self) -> TickReport {
        let outcome = self.probe.probe().await;
        self.process_outcome(outcome).await
    }

    /// Window → engine → maintenance gate → notifier, for one outcome.
    pub async fn process_outcome(&mut self, outcome: ProbeOutcome) -> TickReport {
        // One consistent view of the live settings for the whole decision.
        let settings = self.live.snapshot();
        let previous_pool = self.window.pool_state().current_active_pool.clone();

        let snapshot = self.window.record_outcome(outcome.clone());
        metrics::record_window(snapshot.error_rate_pct, snapshot.sample_count);
        if let Some(active) = &snapshot.active_pool {
            if previous_pool.as_deref() != Some(active.as_str()) {
                metrics::record_active_pool(previous_pool.as_deref(), active);
            }
        }

        let intents = self.engine.evaluate(&snapshot);
        let mut dispatches = Vec::with_capacity(intents.len());
        for alert in intents {
            let result = self.dispatch(&alert, &settings).await;
            metrics::record_alert(alert.kind, result);
            dispatches.push(Dispatch { alert, outcome: result });
        }

        self.update_status(&snapshot, outcome, &settings);
        self.log_stats(&snapshot);

        TickReport { snapshot, dispatches }
    }

    async fn dispatch(&mut self, alert: &AlertIntent, settings: &RuntimeSettings) -> AlertOutcome {
        if settings.maintenance_mode {
            tracing::warn!(
                alert_id = %alert.id,
                kind = %alert.kind,
                "[MAINTENANCE] Alert Suppressed"
            );
            self.status.deliveries.suppressed += 1;
            self.status.push_suppressed(SuppressedAlert {
                id: alert.id,
                kind: alert.kind,
                at: alert.at,
                message: message::render_plain(alert),
            });
            return AlertOutcome::Suppressed;
        }

        if self.stopping {
            return self.drop_on_shutdown(alert);
        }

        let delivery = time::timeout(self.delivery_timeout, self.notifier.deliver(alert));
        let result = match self.shutdown.as_mut() {
            Some(shutdown) => tokio::select! {
                biased;
                _ = shutdown.recv() => None,
                result = delivery => Some(result),
            },
            None => Some(delivery.await),
        };
        let Some(result) = result else {
            self.stopping = true;
            return self.drop_on_shutdown(alert);
        };

        match result {
            Ok(Ok(())) => {
                tracing::info!(
                    alert_id = %alert.id,
                    kind = %alert.kind,
                    channel = self.notifier.name(),
                    "Alert delivered"
                );
                self.status.deliveries.delivered += 1;
                AlertOutcome::Delivered
            }
            Ok(Err(e)) => {
                tracing::error!(
                    alert_id = %alert.id,
                    kind = %alert.kind,
                    channel = self.notifier.name(),
                    error = %e,
                    "Alert delivery failed"
                );
                self.status.deliveries.failed += 1;
                AlertOutcome::Failed
            }
            Err(_) => {
                tracing::error!(
                    alert_id = %alert.id,
                    kind = %alert.kind,
                    channel = self.notifier.name(),
                    timeout_ms = self.delivery_timeout.as_millis() as u64,
                    "Alert delivery timed out"
                );
                self.status.deliveries.failed += 1;
                AlertOutcome::Failed
            }
        }
    }

    fn drop_on_shutdown(&mut self, alert: &AlertIntent) -> AlertOutcome {
        tracing::error!(
            alert_id = %alert.id,
            kind = %alert.kind,
            channel = self.notifier.name(),
            message = %message::render_plain(alert),
            "Alert dropped on shutdown"
        );
        self.status.deliveries.failed += 1;
        AlertOutcome::Failed
    }

    fn update_status(
        &mut self,
        snapshot: &WindowSnapshot,
        outcome: ProbeOutcome,
        settings: &RuntimeSettings,
    ) {
        self.status.ticks += 1;
        self.status.maintenance_mode = settings.maintenance_mode;
        self.status.pool = self.window.pool_state().clone();
        self.status.error_rate_pct = snapshot.error_rate_pct;
        self.status.error_count = snapshot.error_count;
        self.status.sample_count = snapshot.sample_count;
        self.status.alerts = self.engine.status().clone();
        self.status.last_outcome = Some(outcome);
        self.status_tx.send_replace(self.status.clone());
    }

    fn log_stats(&self, snapshot: &WindowSnapshot) {
        if self.stats_log_every == 0 || self.status.ticks % self.stats_log_every != 0 {
            return;
        }
        tracing::info!(
            probes = self.status.ticks,
            pool = snapshot.active_pool.as_deref().unwrap_or("unknown"),
            error_rate_pct = %format!("{:.1}", snapshot.error_rate_pct),
            samples = snapshot.sample_count,
            "Stats"
        );
    }
}
