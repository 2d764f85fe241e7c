//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the watcher.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the watcher.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct WatcherConfig {
    /// Public endpoint being sampled.
    pub target: TargetConfig,

    /// Probe cadence.
    pub polling: PollingConfig,

    /// Rolling window and pool-transition settings.
    pub window: WindowConfig,

    /// Alert thresholds, cooldown and maintenance flag.
    pub alerts: AlertConfig,

    /// Notification channel.
    pub notifier: NotifierConfig,

    /// Operator control surface.
    pub admin: AdminConfig,

    /// Logging and metrics.
    pub observability: ObservabilityConfig,

    /// Startup/shutdown behaviour.
    pub lifecycle: LifecycleConfig,
}

/// Target endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TargetConfig {
    /// Full URL of the public endpoint (e.g., "http://localhost:8080/version").
    pub url: String,

    /// Response header carrying the pool identity.
    pub pool_header: String,

    /// Response header carrying the release id.
    pub release_header: String,

    /// Per-probe timeout in milliseconds. Must be below the poll interval.
    pub request_timeout_ms: u64,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            pool_header: "X-App-Pool".to_string(),
            release_header: "X-Release-Id".to_string(),
            request_timeout_ms: 800,
        }
    }
}

/// Probe scheduling configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct PollingConfig {
    /// Interval between probes in milliseconds.
    pub interval_ms: u64,

    /// Emit a stats log line every N samples (0 disables).
    pub stats_log_every: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_ms: 1000,
            stats_log_every: 50,
        }
    }
}

/// Rolling window configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    /// Number of most recent outcomes kept.
    pub size: usize,

    /// Fraction of `size` that must be filled before error-rate alerts fire.
    pub min_sample_ratio: f64,

    /// Explicit sample floor; overrides `min_sample_ratio` when set.
    pub min_samples: Option<usize>,

    /// Consecutive probes that must agree on a new pool before a transition.
    pub corroboration: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            size: 200,
            min_sample_ratio: 0.10,
            min_samples: None,
            corroboration: 2,
        }
    }
}

impl WindowConfig {
    /// Minimum number of samples before the error-rate track may alert.
    pub fn sample_floor(&self) -> usize {
        let floor = match self.min_samples {
            Some(n) => n,
            None => ((self.size as f64) * self.min_sample_ratio).ceil() as usize,
        };
        floor.max(1)
    }
}

/// Alerting configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct AlertConfig {
    /// Error rate (percent) above which the window is degraded.
    pub error_rate_threshold_pct: f64,

    /// Minimum interval between re-notifications of an ongoing condition.
    pub cooldown_ms: u64,

    /// Suppress delivery while still tracking state. Hot-reloadable.
    pub maintenance_mode: bool,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            error_rate_threshold_pct: 2.0,
            cooldown_ms: 300_000,
            maintenance_mode: false,
        }
    }
}

/// Notification channel configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct NotifierConfig {
    /// Slack-compatible incoming webhook. Alerts are only logged when unset.
    pub webhook_url: Option<String>,

    /// Delivery timeout in milliseconds.
    pub timeout_ms: u64,

    /// Display name override sent with each message.
    pub username: Option<String>,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            timeout_ms: 5000,
            username: None,
        }
    }
}

/// Admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct AdminConfig {
    /// Enable the admin API.
    pub enabled: bool,

    /// Admin API bind address.
    pub bind_address: String,

    /// API key for authentication (Bearer token).
    pub api_key: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            bind_address: "127.0.0.1:9191".to_string(),
            api_key: String::new(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log line format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9898".to_string(),
        }
    }
}

/// Lifecycle configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LifecycleConfig {
    /// How long shutdown waits for an in-flight tick before aborting it.
    pub shutdown_grace_ms: u64,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            shutdown_grace_ms: 5000,
        }
    }
}
