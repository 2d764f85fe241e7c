//! Startup orchestration.
//!
//! # Responsibilities
//! - Initialize all subsystems in dependency order
//! - Start background tasks (watcher loop, admin API, config reload)
//! - Wait for a shutdown signal and drain tasks within the grace period
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Steady-state failures never reach this level

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};

use crate::admin::{self, AdminState};
use crate::config::watcher::{reload_into, ConfigWatcher, ReloadState};
use crate::config::{LiveSettings, WatcherConfig};
use crate::lifecycle::shutdown::{drain, Shutdown};
use crate::lifecycle::signals::{forward_signals, SignalEvent};
use crate::monitor::Watcher;
use crate::notifier;
use crate::observability::metrics;
use crate::probe::HttpProber;

/// Fatal startup failure.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },

    #[error("failed to install signal handlers: {0}")]
    Signals(std::io::Error),
}

/// Run the watcher until a shutdown signal arrives.
///
/// `config_path` enables file-based hot reload of the maintenance flag.
pub async fn run(config: WatcherConfig, config_path: Option<PathBuf>) -> Result<(), StartupError> {
    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse::<SocketAddr>() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let live = Arc::new(LiveSettings::new(config.alerts.maintenance_mode));
    let probe = Arc::new(HttpProber::new(&config.target)?);
    let notifier = notifier::from_config(&config.notifier)?;
    let watcher = Watcher::new(&config, probe, notifier, Arc::clone(&live));
    let status = watcher.subscribe();

    let shutdown = Shutdown::new();

    let admin_handle = if config.admin.enabled {
        let listener = TcpListener::bind(&config.admin.bind_address)
            .await
            .map_err(|source| StartupError::Bind {
                address: config.admin.bind_address.clone(),
                source,
            })?;
        let state = AdminState::new(Arc::clone(&live), status, config.admin.api_key.clone());
        let admin_shutdown = shutdown.subscribe();
        Some(tokio::spawn(async move {
            if let Err(e) = admin::serve(listener, state, admin_shutdown).await {
                tracing::error!(error = %e, "Admin API stopped with error");
            }
        }))
    } else {
        None
    };

    // The notify handle must stay alive for file watching to continue.
    let reload = match &config_path {
        Some(path) => {
            let (file_watcher, updates) = ConfigWatcher::new(path);
            let sender = file_watcher.sender();
            let guard = match file_watcher.run() {
                Ok(guard) => Some(guard),
                Err(e) => {
                    tracing::warn!(error = %e, "Config file watching unavailable; SIGHUP still reloads");
                    None
                }
            };
            spawn_reload_applier(config.clone(), Arc::clone(&live), updates, shutdown.subscribe());
            Some((path.clone(), sender, guard))
        }
        None => None,
    };

    let (signal_tx, mut signal_rx) = mpsc::unbounded_channel();
    let signal_task = tokio::spawn(forward_signals(signal_tx));

    let watcher_handle = tokio::spawn(watcher.run(shutdown.subscribe()));

    tracing::info!("pool-watcher running");

    while let Some(event) = signal_rx.recv().await {
        match event {
            SignalEvent::Reload => match &reload {
                Some((path, sender, _)) => reload_into(path, sender),
                None => tracing::warn!("SIGHUP ignored: watcher was started without a config file"),
            },
            SignalEvent::Shutdown => break,
        }
    }

    // The signal task ends on its own after a shutdown event; a failed
    // registration shows up here as an early return.
    if signal_task.is_finished() {
        match signal_task.await {
            Ok(Err(e)) => {
                shutdown.trigger();
                return Err(StartupError::Signals(e));
            }
            Ok(Ok(())) | Err(_) => {}
        }
    }

    tracing::info!("Shutting down");
    shutdown.trigger();

    let grace = Duration::from_millis(config.lifecycle.shutdown_grace_ms);
    drain("watcher", watcher_handle, grace).await;
    if let Some(handle) = admin_handle {
        drain("admin", handle, grace).await;
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

fn spawn_reload_applier(
    initial: WatcherConfig,
    live: Arc<LiveSettings>,
    mut updates: mpsc::UnboundedReceiver<WatcherConfig>,
    mut shutdown: broadcast::Receiver<()>,
) {
    tokio::spawn(async move {
        let mut state = ReloadState::new(initial);
        loop {
            tokio::select! {
                _ = shutdown.recv() => break,
                update = updates.recv() => match update {
                    Some(reloaded) => {
                        state.apply(&live, &reloaded);
                    }
                    None => break,
                },
            }
        }
    });
}
