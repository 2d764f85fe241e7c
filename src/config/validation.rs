//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, percentages within bounds)
//! - Cross-field checks (probe timeout must fit inside the poll interval)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: WatcherConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;
use url::Url;

use crate::config::schema::WatcherConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("target.url is required")]
    MissingTargetUrl,

    #[error("{field} is not a valid http(s) URL: {value}")]
    InvalidUrl { field: &'static str, value: String },

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error(
        "target.request_timeout_ms ({timeout_ms}) must be less than polling.interval_ms ({interval_ms})"
    )]
    TimeoutNotBelowInterval { timeout_ms: u64, interval_ms: u64 },

    #[error("alerts.error_rate_threshold_pct must be within [0, 100], got {0}")]
    ThresholdOutOfRange(f64),

    #[error("window.min_sample_ratio must be within (0, 1], got {0}")]
    RatioOutOfRange(f64),

    #[error("window.min_samples ({min_samples}) exceeds window.size ({size})")]
    FloorExceedsWindow { min_samples: usize, size: usize },

    #[error("admin.api_key must be set when the admin API is enabled")]
    MissingApiKey,

    #[error("{field} is not a valid socket address: {value}")]
    InvalidAddress { field: &'static str, value: String },

    #[error(
        "lifecycle.shutdown_grace_ms ({grace_ms}) must exceed target.request_timeout_ms ({timeout_ms})"
    )]
    GraceNotAboveProbeTimeout { grace_ms: u64, timeout_ms: u64 },
}

/// Validate a configuration, collecting every violation.
pub fn validate_config(config: &WatcherConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.target.url.trim().is_empty() {
        errors.push(ValidationError::MissingTargetUrl);
    } else if !is_http_url(&config.target.url) {
        errors.push(ValidationError::InvalidUrl {
            field: "target.url",
            value: config.target.url.clone(),
        });
    }

    if config.polling.interval_ms == 0 {
        errors.push(ValidationError::Zero { field: "polling.interval_ms" });
    }
    if config.target.request_timeout_ms == 0 {
        errors.push(ValidationError::Zero { field: "target.request_timeout_ms" });
    } else if config.target.request_timeout_ms >= config.polling.interval_ms {
        errors.push(ValidationError::TimeoutNotBelowInterval {
            timeout_ms: config.target.request_timeout_ms,
            interval_ms: config.polling.interval_ms,
        });
    }

    if config.window.size == 0 {
        errors.push(ValidationError::Zero { field: "window.size" });
    }
    if config.window.corroboration == 0 {
        errors.push(ValidationError::Zero { field: "window.corroboration" });
    }
    let ratio = config.window.min_sample_ratio;
    if !(ratio > 0.0 && ratio <= 1.0) {
        errors.push(ValidationError::RatioOutOfRange(ratio));
    }
    if let Some(min_samples) = config.window.min_samples {
        if min_samples > config.window.size {
            errors.push(ValidationError::FloorExceedsWindow {
                min_samples,
                size: config.window.size,
            });
        }
    }

    let threshold = config.alerts.error_rate_threshold_pct;
    if !(0.0..=100.0).contains(&threshold) {
        errors.push(ValidationError::ThresholdOutOfRange(threshold));
    }

    if config.notifier.timeout_ms == 0 {
        errors.push(ValidationError::Zero { field: "notifier.timeout_ms" });
    }
    if let Some(webhook) = &config.notifier.webhook_url {
        if !is_http_url(webhook) {
            errors.push(ValidationError::InvalidUrl {
                field: "notifier.webhook_url",
                value: webhook.clone(),
            });
        }
    }

    if config.admin.enabled {
        if config.admin.api_key.is_empty() {
            errors.push(ValidationError::MissingApiKey);
        }
        if config.admin.bind_address.parse::<std::net::SocketAddr>().is_err() {
            errors.push(ValidationError::InvalidAddress {
                field: "admin.bind_address",
                value: config.admin.bind_address.clone(),
            });
        }
    }

    // An in-flight probe must be able to finish before the loop is aborted.
    if config.target.request_timeout_ms > 0
        && config.lifecycle.shutdown_grace_ms <= config.target.request_timeout_ms
    {
        errors.push(ValidationError::GraceNotAboveProbeTimeout {
            grace_ms: config.lifecycle.shutdown_grace_ms,
            timeout_ms: config.target.request_timeout_ms,
        });
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<std::net::SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_http_url(raw: &str) -> bool {
    match Url::parse(raw) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.host().is_some(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> WatcherConfig {
        let mut config = WatcherConfig::default();
        config.target.url = "http://localhost:8080/version".to_string();
        config
    }

    #[test]
    fn test_defaults_with_url_are_valid() {
        assert_eq!(validate_config(&valid_config()), Ok(()));
    }

    #[test]
    fn test_missing_url() {
        let errors = validate_config(&WatcherConfig::default()).unwrap_err();
        assert_eq!(errors, vec![ValidationError::MissingTargetUrl]);
    }

    #[test]
    fn test_timeout_must_be_below_interval() {
        let mut config = valid_config();
        config.target.request_timeout_ms = 1000;
        config.polling.interval_ms = 1000;

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::TimeoutNotBelowInterval {
            timeout_ms: 1000,
            interval_ms: 1000,
        }));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = valid_config();
        config.target.url = "ftp://example.com".to_string();
        config.window.size = 0;
        config.alerts.error_rate_threshold_pct = 150.0;
        config.notifier.webhook_url = Some("not a url".to_string());
        config.admin.enabled = true;

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.len() >= 5, "got {:?}", errors);
        assert!(errors.contains(&ValidationError::Zero { field: "window.size" }));
        assert!(errors.contains(&ValidationError::ThresholdOutOfRange(150.0)));
        assert!(errors.contains(&ValidationError::MissingApiKey));
    }

    #[test]
    fn test_grace_must_outlast_probe_timeout() {
        let mut config = valid_config();
        config.lifecycle.shutdown_grace_ms = 500;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::GraceNotAboveProbeTimeout {
                grace_ms: 500,
                timeout_ms: 800,
            }]
        );
    }

    #[test]
    fn test_floor_cannot_exceed_window() {
        let mut config = valid_config();
        config.window.size = 10;
        config.window.min_samples = Some(11);

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::FloorExceedsWindow { min_samples: 11, size: 10 }]
        );
    }
}
