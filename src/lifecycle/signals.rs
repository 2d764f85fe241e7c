//! OS signal handling.
//!
//! # Responsibilities
//! - Register signal handlers (SIGTERM, SIGINT, SIGHUP)
//! - Translate signals to internal events
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - SIGHUP triggers config reload, not shutdown

use tokio::sync::mpsc;

/// What the process should do in response to a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalEvent {
    Shutdown,
    Reload,
}

/// Forward signals as [`SignalEvent`]s until a shutdown signal is seen.
#[cfg(unix)]
pub async fn forward_signals(events: mpsc::UnboundedSender<SignalEvent>) -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate())?;
    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut hangup = signal(SignalKind::hangup())?;

    loop {
        let event = tokio::select! {
            _ = terminate.recv() => {
                tracing::info!("SIGTERM received");
                SignalEvent::Shutdown
            }
            _ = interrupt.recv() => {
                tracing::info!("SIGINT received");
                SignalEvent::Shutdown
            }
            _ = hangup.recv() => {
                tracing::info!("SIGHUP received, reloading configuration");
                SignalEvent::Reload
            }
        };

        if events.send(event).is_err() || event == SignalEvent::Shutdown {
            return Ok(());
        }
    }
}

/// Forward Ctrl+C as a shutdown event.
#[cfg(not(unix))]
pub async fn forward_signals(events: mpsc::UnboundedSender<SignalEvent>) -> std::io::Result<()> {
    tokio::signal::ctrl_c().await?;
    tracing::info!("Ctrl+C received");
    let _ = events.send(SignalEvent::Shutdown);
    Ok(())
}
