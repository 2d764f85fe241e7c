//! Notification subsystem.
//!
//! # Data Flow
//! ```text
//! AlertIntent (already past the maintenance gate)
//!     → message.rs (render Slack mrkdwn)
//!     → webhook.rs (single bounded POST) | log.rs (no channel configured)
//!     → Ok / DeliveryError (logged by the caller, never fatal)
//! ```
//!
//! # Design Decisions
//! - No automatic retry: a missed alert beats a retry storm
//! - Every delivery has a timeout; the monitor adds an outer bound as well

pub mod log;
pub mod message;
pub mod webhook;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::alerting::AlertIntent;
use crate::config::NotifierConfig;

pub use log::LogNotifier;
pub use webhook::WebhookNotifier;

/// Why a delivery attempt failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    #[error("delivery timed out")]
    Timeout,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("channel responded with HTTP {0}")]
    Status(u16),
}

/// An operator notification channel.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Short channel name for logs and metrics.
    fn name(&self) -> &'static str;

    async fn deliver(&self, alert: &AlertIntent) -> Result<(), DeliveryError>;
}

/// Build the channel described by `config`.
pub fn from_config(config: &NotifierConfig) -> Result<Arc<dyn Notifier>, reqwest::Error> {
    match &config.webhook_url {
        Some(url) => Ok(Arc::new(WebhookNotifier::new(url.clone(), config)?)),
        None => {
            tracing::warn!("Notification webhook not configured, alerts will only be logged");
            Ok(Arc::new(LogNotifier))
        }
    }
}
