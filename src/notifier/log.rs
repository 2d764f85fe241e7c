//! Fallback channel used when no webhook is configured.

use async_trait::async_trait;

use crate::alerting::AlertIntent;
use crate::notifier::{message, DeliveryError, Notifier};

/// Writes alerts to the log only.
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn deliver(&self, alert: &AlertIntent) -> Result<(), DeliveryError> {
        tracing::warn!(
            alert_id = %alert.id,
            kind = %alert.kind,
            message = %message::render_plain(alert),
            "Notification webhook not configured, alert logged only"
        );
        Ok(())
    }
}
