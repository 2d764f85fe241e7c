//! Active HTTP probing of the public endpoint.
//!
//! # Responsibilities
//! - Issue one bounded GET per call
//! - Extract pool / release identity from response headers
//! - Classify the attempt without ever returning an error

use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::HeaderMap;
use tokio::time;

use crate::config::TargetConfig;
use crate::observability::metrics;
use crate::probe::{Probe, ProbeOutcome, ProbeResult};

/// Probes the target URL with reqwest.
pub struct HttpProber {
    client: reqwest::Client,
    url: String,
    pool_header: String,
    release_header: String,
    timeout: Duration,
}

impl HttpProber {
    pub fn new(config: &TargetConfig) -> Result<Self, reqwest::Error> {
        let timeout = Duration::from_millis(config.request_timeout_ms);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .user_agent(concat!("pool-watcher/", env!("CARGO_PKG_VERSION")))
            .no_proxy()
            .build()?;

        Ok(Self {
            client,
            url: config.url.clone(),
            pool_header: config.pool_header.clone(),
            release_header: config.release_header.clone(),
            timeout,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }
}

#[async_trait]
impl Probe for HttpProber {
    async fn probe(&self) -> ProbeOutcome {
        let timestamp = Utc::now();
        let started = Instant::now();
        let request = self.client.get(&self.url).send();

        // reqwest enforces the timeout too; this bounds DNS and anything else it does not cover.
        let outcome = match time::timeout(self.timeout, request).await {
            Ok(Ok(response)) => {
                let status = response.status();
                let headers = response.headers();
                let pool = Self::header_value(headers, &self.pool_header);
                let release = Self::header_value(headers, &self.release_header);

                if status.is_server_error() {
                    tracing::warn!(url = %self.url, status = %status, pool = ?pool, "Probe failed: server error");
                } else if !status.is_success() {
                    tracing::debug!(url = %self.url, status = %status, "Probe returned non-success status");
                }

                ProbeOutcome::from_response(timestamp, status.as_u16(), pool, release, started.elapsed())
            }
            Ok(Err(e)) if e.is_timeout() => {
                tracing::warn!(url = %self.url, "Probe failed: timeout");
                ProbeOutcome::failed(timestamp, ProbeResult::Timeout, started.elapsed())
            }
            Ok(Err(e)) => {
                tracing::warn!(url = %self.url, error = %e, "Probe failed: connection error");
                ProbeOutcome::failed(timestamp, ProbeResult::ConnectionError, started.elapsed())
            }
            Err(_) => {
                tracing::warn!(url = %self.url, "Probe failed: timeout");
                ProbeOutcome::failed(timestamp, ProbeResult::Timeout, started.elapsed())
            }
        };

        metrics::record_probe(outcome.result, outcome.latency);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_header_value_trims_and_drops_empty() {
        let mut headers = HeaderMap::new();
        headers.insert("x-app-pool", HeaderValue::from_static(" blue "));
        headers.insert("x-release-id", HeaderValue::from_static(""));

        assert_eq!(
            HttpProber::header_value(&headers, "X-App-Pool").as_deref(),
            Some("blue")
        );
        assert_eq!(HttpProber::header_value(&headers, "X-Release-Id"), None);
        assert_eq!(HttpProber::header_value(&headers, "X-Missing"), None);
    }

    #[tokio::test]
    async fn test_unreachable_target_is_connection_error() {
        // Port 9 (discard) on localhost is closed in test environments.
        let config = TargetConfig {
            url: "http://127.0.0.1:9/version".to_string(),
            request_timeout_ms: 500,
            ..TargetConfig::default()
        };
        let prober = HttpProber::new(&config).unwrap();

        let outcome = prober.probe().await;
        assert!(matches!(
            outcome.result,
            ProbeResult::ConnectionError | ProbeResult::Timeout
        ));
        assert!(outcome.observed_pool.is_none());
    }
}
