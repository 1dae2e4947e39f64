use std::{collections::HashMap, fs, path::Path, time::Duration};

use anyhow::Context;
use thiserror::Error;
use url::Url;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_CONFIG_FILE: &str = "biotools.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub api_base_url: String,
    pub request_timeout: Duration,
    pub health_poll_interval: Duration,
    pub probe_timeout: Duration,
    pub stats_debounce: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            request_timeout: Duration::from_secs(10),
            health_poll_interval: Duration::from_secs(30),
            probe_timeout: Duration::from_secs(10),
            stats_debounce: Duration::from_millis(500),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid api base url '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("invalid value '{value}' for {key}: expected a non-negative integer")]
    InvalidNumber { key: String, value: String },
}

/// Resolves settings from `biotools.toml` in the working directory and the
/// process environment, in that order.
pub fn load_settings() -> anyhow::Result<ClientSettings> {
    load_settings_from(Path::new(DEFAULT_CONFIG_FILE), |key| std::env::var(key).ok())
}

pub fn load_settings_from(
    config_path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<ClientSettings> {
    let mut settings = ClientSettings::default();

    if config_path.exists() {
        let raw = fs::read_to_string(config_path)
            .with_context(|| format!("failed to read config file '{}'", config_path.display()))?;
        let file_cfg = toml::from_str::<HashMap<String, toml::Value>>(&raw)
            .with_context(|| format!("failed to parse config file '{}'", config_path.display()))?;
        for (key, value) in file_cfg {
            let value = match value {
                toml::Value::String(s) => s,
                other => other.to_string(),
            };
            apply_setting(&mut settings, &key, &value)?;
        }
    }

    for (var, key) in [
        ("REACT_APP_API_URL", "api_url"),
        ("BIOTOOLS_API_URL", "api_url"),
        ("APP__API_URL", "api_url"),
        ("APP__REQUEST_TIMEOUT_MS", "request_timeout_ms"),
        ("APP__HEALTH_POLL_SECS", "health_poll_secs"),
        ("APP__PROBE_TIMEOUT_MS", "probe_timeout_ms"),
        ("APP__STATS_DEBOUNCE_MS", "stats_debounce_ms"),
    ] {
        if let Some(value) = env(var) {
            apply_setting(&mut settings, key, &value)?;
        }
    }

    Ok(settings)
}

fn apply_setting(settings: &mut ClientSettings, key: &str, value: &str) -> Result<(), ConfigError> {
    match key {
        "api_url" => settings.api_base_url = normalize_base_url(value)?,
        "request_timeout_ms" => {
            settings.request_timeout = Duration::from_millis(parse_number(key, value)?)
        }
        "health_poll_secs" => {
            settings.health_poll_interval = Duration::from_secs(parse_number(key, value)?.max(1))
        }
        "probe_timeout_ms" => settings.probe_timeout = Duration::from_millis(parse_number(key, value)?),
        "stats_debounce_ms" => {
            settings.stats_debounce = Duration::from_millis(parse_number(key, value)?)
        }
        other => tracing::debug!(key = other, "ignoring unknown config key"),
    }
    Ok(())
}

fn parse_number(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse::<u64>().map_err(|_| ConfigError::InvalidNumber {
        key: key.to_string(),
        value: value.to_string(),
    })
}

/// Validates an http(s) base url and strips trailing slashes. Blank input
/// falls back to the default.
pub fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(DEFAULT_API_BASE_URL.to_string());
    }

    let parsed = Url::parse(raw).map_err(|err| ConfigError::InvalidBaseUrl {
        url: raw.to_string(),
        reason: err.to_string(),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidBaseUrl {
            url: raw.to_string(),
            reason: "scheme must be http or https".to_string(),
        });
    }

    Ok(raw.trim_end_matches('/').to_string())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
