use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{GriddleError, Result};

fn default_timeout_secs() -> u64 {
    30
}

fn default_retry_budget() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    1000
}

/// Connection settings for one tracker instance.
///
/// `retry_budget` bounds how many rate-limit retries a single call may spend;
/// it is copied into each call rather than shared, so concurrent requests
/// never contend on retry state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub base_url: String,
    pub api_key: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_retry_budget")]
    pub retry_budget: u32,
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

impl ServiceConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        ServiceConfig {
            base_url: base_url.into(),
            api_key: api_key.into(),
            timeout_secs: default_timeout_secs(),
            retry_budget: default_retry_budget(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }

    /// Load configuration from `{data_dir}/griddle.json`, falling back to
    /// `GRIDDLE_*` environment variables when the file is missing or broken.
    pub fn load_or_env(data_dir: &Path) -> Result<Self> {
        let config_json = data_dir.join("griddle.json");

        if config_json.exists() {
            match std::fs::read_to_string(&config_json) {
                Ok(content) => match serde_json::from_str::<ServiceConfig>(&content) {
                    Ok(config) => {
                        tracing::info!(
                            "Loaded tracker config: base_url={}, timeout={}s",
                            config.base_url,
                            config.timeout_secs
                        );
                        return Ok(config);
                    }
                    Err(e) => {
                        tracing::error!("Failed to parse griddle.json: {}, trying env", e);
                    }
                },
                Err(e) => {
                    tracing::error!("Failed to read griddle.json: {}, trying env", e);
                }
            }
        }

        Self::from_env()
    }

    /// Build configuration from `GRIDDLE_BASE_URL`, `GRIDDLE_API_KEY` and the
    /// optional `GRIDDLE_TIMEOUT_SECS` / `GRIDDLE_RETRY_BUDGET` overrides.
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("GRIDDLE_BASE_URL")
            .map_err(|_| GriddleError::Config("GRIDDLE_BASE_URL is not set".to_string()))?;
        let api_key = std::env::var("GRIDDLE_API_KEY")
            .map_err(|_| GriddleError::Config("GRIDDLE_API_KEY is not set".to_string()))?;

        let mut config = ServiceConfig::new(base_url, api_key);
        if let Some(secs) = read_env_number("GRIDDLE_TIMEOUT_SECS")? {
            config.timeout_secs = secs;
        }
        if let Some(budget) = read_env_number::<u32>("GRIDDLE_RETRY_BUDGET")? {
            config.retry_budget = budget;
        }

        tracing::info!(
            "Tracker config from env: base_url={}, timeout={}s",
            config.base_url,
            config.timeout_secs
        );
        Ok(config)
    }
}

fn read_env_number<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match std::env::var(name) {
        Ok(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|_| GriddleError::Config(format!("{} is not a valid number: {}", name, raw))),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::new("https://tracker.example.com", "key");
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.retry_budget, 3);
        assert_eq!(config.retry_backoff_ms, 1000);
    }

    #[test]
    fn test_load_valid_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("griddle.json");

        let config_str = r#"{
            "base_url": "https://tracker.example.com",
            "api_key": "secret",
            "timeout_secs": 10
        }"#;

        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(config_str.as_bytes()).unwrap();

        let config = ServiceConfig::load_or_env(temp_dir.path()).unwrap();
        assert_eq!(config.base_url, "https://tracker.example.com");
        assert_eq!(config.api_key, "secret");
        assert_eq!(config.timeout_secs, 10);
        // Unspecified fields keep their defaults
        assert_eq!(config.retry_budget, 3);
    }

    #[test]
    fn test_missing_file_and_env_is_config_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::env::remove_var("GRIDDLE_BASE_URL");
        std::env::remove_var("GRIDDLE_API_KEY");

        let err = ServiceConfig::load_or_env(temp_dir.path()).unwrap_err();
        assert!(matches!(err, GriddleError::Config(_)));
    }
}
