//! Feed configuration loading

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config file: {0}")]
    FileError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Price feed configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Upstream endpoint returning the JSON price array
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Seconds between scheduled refreshes
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,

    /// Per-request HTTP timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_endpoint() -> String {
    "https://interview.switcheo.com/prices.json".to_string()
}

fn default_refresh_interval_secs() -> u64 {
    15
}

fn default_request_timeout_secs() -> u64 {
    10
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            refresh_interval_secs: default_refresh_interval_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl FeedConfig {
    /// Load from a YAML file, then apply environment overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config: FeedConfig = serde_yaml::from_str(&content)?;
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Defaults plus environment overrides, for running without a file.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Scheduled refresh interval as a [`Duration`].
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    /// Environment overrides: `PRICE_FEED_URL`, `PRICE_FEED_REFRESH_SECS`,
    /// `PRICE_FEED_TIMEOUT_SECS`.
    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("PRICE_FEED_URL") {
            self.endpoint = url;
        }
        if let Ok(secs) = std::env::var("PRICE_FEED_REFRESH_SECS") {
            if let Ok(secs) = secs.parse() {
                self.refresh_interval_secs = secs;
            }
        }
        if let Ok(secs) = std::env::var("PRICE_FEED_TIMEOUT_SECS") {
            if let Ok(secs) = secs.parse() {
                self.request_timeout_secs = secs;
            }
        }
    }

    fn validate(&self) -> Result<()> {
        if self.endpoint.is_empty() {
            return Err(ConfigError::ValidationError(
                "endpoint must not be empty".to_string(),
            ));
        }
        if self.refresh_interval_secs == 0 {
            return Err(ConfigError::ValidationError(
                "refresh_interval_secs must be positive".to_string(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "request_timeout_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
