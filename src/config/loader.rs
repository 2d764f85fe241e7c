//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::WatcherConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid environment override {name}={value}")]
    Env { name: &'static str, value: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file, then apply env overrides.
pub fn load_config(path: &Path) -> Result<WatcherConfig, ConfigError> {
    finalize(parse_file(path)?, env_lookup)
}

/// Like [`load_config`], but warns about file values hidden by the environment.
pub fn reload_config(path: &Path) -> Result<WatcherConfig, ConfigError> {
    let file = parse_file(path)?;
    let masked = masked_overrides(&file, env_lookup);
    if !masked.is_empty() {
        tracing::warn!(
            variables = ?masked,
            "Config file values are overridden by environment variables and were not applied"
        );
    }
    finalize(file, env_lookup)
}

fn parse_file(path: &Path) -> Result<WatcherConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Build configuration from defaults and environment variables only.
pub fn load_from_env() -> Result<WatcherConfig, ConfigError> {
    finalize(WatcherConfig::default(), env_lookup)
}

/// Apply overrides from `lookup`, then validate.
pub fn finalize<F>(mut config: WatcherConfig, lookup: F) -> Result<WatcherConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    apply_env_overrides(&mut config, lookup)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Environment variables understood by the watcher deployment.
pub fn apply_env_overrides<F>(config: &mut WatcherConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup("TARGET_URL") {
        config.target.url = url;
    }
    if let Some(webhook) = lookup("SLACK_WEBHOOK_URL") {
        config.notifier.webhook_url = if webhook.trim().is_empty() {
            None
        } else {
            Some(webhook)
        };
    }
    if let Some(raw) = lookup("ERROR_RATE_THRESHOLD") {
        config.alerts.error_rate_threshold_pct = parse_env("ERROR_RATE_THRESHOLD", raw)?;
    }
    if let Some(raw) = lookup("WINDOW_SIZE") {
        config.window.size = parse_env("WINDOW_SIZE", raw)?;
    }
    if let Some(raw) = lookup("ALERT_COOLDOWN_SEC") {
        let secs: u64 = parse_env("ALERT_COOLDOWN_SEC", raw)?;
        config.alerts.cooldown_ms = secs.saturating_mul(1000);
    }
    if let Some(raw) = lookup("POLL_INTERVAL_MS") {
        config.polling.interval_ms = parse_env("POLL_INTERVAL_MS", raw)?;
    }
    if let Some(raw) = lookup("MAINTENANCE_MODE") {
        config.alerts.maintenance_mode = parse_flag("MAINTENANCE_MODE", raw)?;
    }
    Ok(())
}

/// Environment variables whose value replaces a different value set in `file`.
pub fn masked_overrides<F>(file: &WatcherConfig, lookup: F) -> Vec<&'static str>
where
    F: Fn(&str) -> Option<String>,
{
    let mut merged = file.clone();
    if apply_env_overrides(&mut merged, &lookup).is_err() {
        return Vec::new();
    }

    let checks = [
        ("TARGET_URL", file.target.url != merged.target.url),
        ("SLACK_WEBHOOK_URL", file.notifier.webhook_url != merged.notifier.webhook_url),
        (
            "ERROR_RATE_THRESHOLD",
            file.alerts.error_rate_threshold_pct != merged.alerts.error_rate_threshold_pct,
        ),
        ("WINDOW_SIZE", file.window.size != merged.window.size),
        ("ALERT_COOLDOWN_SEC", file.alerts.cooldown_ms != merged.alerts.cooldown_ms),
        ("POLL_INTERVAL_MS", file.polling.interval_ms != merged.polling.interval_ms),
        (
            "MAINTENANCE_MODE",
            file.alerts.maintenance_mode != merged.alerts.maintenance_mode,
        ),
    ];

    checks
        .into_iter()
        .filter(|(_, differs)| *differs)
        .map(|(name, _)| name)
        .collect()
}

fn parse_env<T: std::str::FromStr>(name: &'static str, raw: String) -> Result<T, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::Env { name, value: raw })
}

fn parse_flag(name: &'static str, raw: String) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::Env { name, value: raw }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_env_overrides_applied() {
        let config = finalize(
            WatcherConfig::default(),
            env(&[
                ("TARGET_URL", "http://nginx:80/version"),
                ("SLACK_WEBHOOK_URL", "https://hooks.slack.com/services/T/B/X"),
                ("ERROR_RATE_THRESHOLD", "5"),
                ("WINDOW_SIZE", "100"),
                ("ALERT_COOLDOWN_SEC", "60"),
                ("MAINTENANCE_MODE", "TRUE"),
            ]),
        )
        .unwrap();

        assert_eq!(config.target.url, "http://nginx:80/version");
        assert_eq!(
            config.notifier.webhook_url.as_deref(),
            Some("https://hooks.slack.com/services/T/B/X")
        );
        assert_eq!(config.alerts.error_rate_threshold_pct, 5.0);
        assert_eq!(config.window.size, 100);
        assert_eq!(config.alerts.cooldown_ms, 60_000);
        assert!(config.alerts.maintenance_mode);
    }

    #[test]
    fn test_malformed_override_is_rejected() {
        let err = finalize(
            WatcherConfig::default(),
            env(&[("TARGET_URL", "http://nginx/"), ("WINDOW_SIZE", "lots")]),
        )
        .unwrap_err();

        assert!(matches!(err, ConfigError::Env { name: "WINDOW_SIZE", .. }));
    }

    #[test]
    fn test_empty_webhook_clears_channel() {
        let mut config = WatcherConfig::default();
        config.notifier.webhook_url = Some("http://hooks.local/x".to_string());
        apply_env_overrides(&mut config, env(&[("SLACK_WEBHOOK_URL", "  ")])).unwrap();
        assert!(config.notifier.webhook_url.is_none());
    }

    #[test]
    fn test_env_masking_file_edit_is_reported() {
        let mut file = WatcherConfig::default();
        file.alerts.maintenance_mode = true;

        assert_eq!(
            masked_overrides(&file, env(&[("MAINTENANCE_MODE", "false")])),
            vec!["MAINTENANCE_MODE"]
        );
        assert!(masked_overrides(&file, env(&[("MAINTENANCE_MODE", "true")])).is_empty());
        assert!(masked_overrides(&file, env(&[])).is_empty());
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [target]
            url = "http://127.0.0.1:8080/version"
            request_timeout_ms = 400

            [polling]
            interval_ms = 500

            [window]
            size = 50
            "#
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.polling.interval_ms, 500);
        assert_eq!(config.window.size, 50);
    }

    #[test]
    fn test_load_config_validation_failure() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[window]\nsize = 0").unwrap();

        match load_config(file.path()) {
            Err(ConfigError::Validation(errors)) => {
                assert!(errors.contains(&ValidationError::Zero { field: "window.size" }));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }
}
