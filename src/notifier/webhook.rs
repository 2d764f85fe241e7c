//! Slack-compatible incoming webhook delivery.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::alerting::AlertIntent;
use crate::config::NotifierConfig;
use crate::notifier::{message, DeliveryError, Notifier};

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    username: Option<&'a str>,
}

/// Posts `{"text": ...}` to a webhook URL. One attempt per alert.
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
    username: Option<String>,
}

impl WebhookNotifier {
    pub fn new(url: String, config: &NotifierConfig) -> Result<Self, reqwest::Error> {
        let timeout = Duration::from_millis(config.timeout_ms);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            url,
            username: config.username.clone(),
        })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    fn name(&self) -> &'static str {
        "webhook"
    }

    async fn deliver(&self, alert: &AlertIntent) -> Result<(), DeliveryError> {
        let payload = WebhookPayload {
            text: message::render(alert),
            username: self.username.as_deref(),
        };

        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    DeliveryError::Timeout
                } else {
                    DeliveryError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DeliveryError::Status(status.as_u16()));
        }

        tracing::debug!(alert_id = %alert.id, kind = %alert.kind, "Webhook accepted alert");
        Ok(())
    }
}
