//! Blue/green pool watcher
//!
//! Samples a proxy endpoint on a fixed interval, tracks which upstream pool
//! is serving traffic, and notifies operators about failovers and elevated
//! error rates.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌──────────────────────────────────────────────────────┐
//!                        │                    POOL WATCHER                       │
//!                        │                                                       │
//!     Proxy endpoint     │  ┌─────────┐    ┌──────────────┐    ┌─────────────┐  │
//!     ◀──────────────────┼──│  probe  │───▶│    window    │───▶│  alerting   │  │
//!     X-App-Pool         │  │  (http) │    │ rolling rate │    │   engine    │  │
//!     X-Release-Id ──────┼─▶│         │    │ + pool track │    │             │  │
//!                        │  └─────────┘    └──────────────┘    └──────┬──────┘  │
//!                        │        ▲                                   │         │
//!                        │        │ tick                              ▼         │
//!                        │  ┌─────────────┐                   ┌──────────────┐  │
//!                        │  │   monitor   │──── maintenance ─▶│   notifier   │──┼──▶ Webhook
//!                        │  │    loop     │       gate        │ (timeout,    │  │
//!                        │  └─────────────┘                   │  no retry)   │  │
//!                        │                                    └──────────────┘  │
//!                        │  ┌─────────────────────────────────────────────────┐ │
//!                        │  │              Cross-Cutting Concerns              │ │
//!                        │  │  ┌────────┐ ┌──────────────┐ ┌───────────────┐  │ │
//!                        │  │  │ config │ │observability │ │   lifecycle   │  │ │
//!                        │  │  │ + live │ │ logs/metrics │ │signals/drain  │  │ │
//!                        │  │  └────────┘ └──────────────┘ └───────────────┘  │ │
//!                        │  │  ┌──────────────────────────────────────────┐   │ │
//!                        │  │  │      admin API (status, maintenance)      │   │ │
//!                        │  │  └──────────────────────────────────────────┘   │ │
//!                        │  └─────────────────────────────────────────────────┘ │
//!                        └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use pool_watcher::config::{load_config, load_from_env};
use pool_watcher::lifecycle::startup;
use pool_watcher::observability::logging;

#[derive(Parser)]
#[command(name = "pool-watcher")]
#[command(about = "Watches a blue/green proxy for failovers and error-rate spikes", long_about = None)]
struct Args {
    /// TOML config file; without it the watcher is configured from the environment.
    #[arg(short, long, env = "WATCHER_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let loaded = match &args.config {
        Some(path) => load_config(path),
        None => load_from_env(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            eprintln!("pool-watcher: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = logging::init_logging(&config.observability) {
        eprintln!("pool-watcher: failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "pool-watcher starting");
    tracing::info!(
        target_url = %config.target.url,
        interval_ms = config.polling.interval_ms,
        window_size = config.window.size,
        threshold_pct = config.alerts.error_rate_threshold_pct,
        cooldown_ms = config.alerts.cooldown_ms,
        maintenance_mode = config.alerts.maintenance_mode,
        webhook_configured = config.notifier.webhook_url.is_some(),
        "Configuration loaded"
    );

    match startup::run(config, args.config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "pool-watcher failed");
            ExitCode::FAILURE
        }
    }
}
