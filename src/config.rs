//! Client configuration management
//!
//! This module handles loading and validating configuration from environment
//! variables. All configuration is loaded once at startup and validated
//! before any network component is constructed.

use std::env;
use std::time::Duration;

use crate::constants::{
    DEFAULT_API_BASE_URL, DEFAULT_HTTP_TIMEOUT_SECONDS, DEFAULT_QUEUE_POLL_INTERVAL_MS,
    DEFAULT_RECONNECT_INTERVAL_MS, DEFAULT_STATUS_POLL_INTERVAL_MS, DEFAULT_WS_BASE_URL,
};

/// Main client configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub telemetry: TelemetryConfig,
    pub polling: PollingConfig,
}

/// REST API configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL including the version prefix, e.g. `http://host/api/v1`
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
}

/// Live log stream configuration
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// WebSocket base URL, e.g. `ws://host`
    pub ws_base_url: String,
    /// Fixed delay between reconnect attempts
    pub reconnect_interval: Duration,
}

/// Submission polling configuration
#[derive(Debug, Clone)]
pub struct PollingConfig {
    /// Status poll interval (while Queued or Running)
    pub status_interval: Duration,
    /// Queue position poll interval (strictly while Queued)
    pub queue_interval: Duration,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            api: ApiConfig::from_env()?,
            telemetry: TelemetryConfig::from_env()?,
            polling: PollingConfig::from_env()?,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            telemetry: TelemetryConfig::default(),
            polling: PollingConfig::default(),
        }
    }
}

impl ApiConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: env::var("ARENA_API_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string()),
            timeout: Duration::from_secs(
                env::var("ARENA_HTTP_TIMEOUT_SECONDS")
                    .unwrap_or_else(|_| DEFAULT_HTTP_TIMEOUT_SECONDS.to_string())
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue("ARENA_HTTP_TIMEOUT_SECONDS".to_string()))?,
            ),
        })
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECONDS),
        }
    }
}

impl TelemetryConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            ws_base_url: env::var("ARENA_WS_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_WS_BASE_URL.to_string()),
            reconnect_interval: Duration::from_millis(
                env::var("ARENA_RECONNECT_INTERVAL_MS")
                    .unwrap_or_else(|_| DEFAULT_RECONNECT_INTERVAL_MS.to_string())
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue("ARENA_RECONNECT_INTERVAL_MS".to_string()))?,
            ),
        })
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            ws_base_url: DEFAULT_WS_BASE_URL.to_string(),
            reconnect_interval: Duration::from_millis(DEFAULT_RECONNECT_INTERVAL_MS),
        }
    }
}

impl PollingConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            status_interval: Duration::from_millis(
                env::var("ARENA_STATUS_POLL_INTERVAL_MS")
                    .unwrap_or_else(|_| DEFAULT_STATUS_POLL_INTERVAL_MS.to_string())
                    .parse()
                    .map_err(|_| {
                        ConfigError::InvalidValue("ARENA_STATUS_POLL_INTERVAL_MS".to_string())
                    })?,
            ),
            queue_interval: Duration::from_millis(
                env::var("ARENA_QUEUE_POLL_INTERVAL_MS")
                    .unwrap_or_else(|_| DEFAULT_QUEUE_POLL_INTERVAL_MS.to_string())
                    .parse()
                    .map_err(|_| {
                        ConfigError::InvalidValue("ARENA_QUEUE_POLL_INTERVAL_MS".to_string())
                    })?,
            ),
        })
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            status_interval: Duration::from_millis(DEFAULT_STATUS_POLL_INTERVAL_MS),
            queue_interval: Duration::from_millis(DEFAULT_QUEUE_POLL_INTERVAL_MS),
        }
    }
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(String),

    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "http://localhost:8080/api/v1");
        assert_eq!(config.polling.status_interval, Duration::from_secs(2));
        assert_eq!(config.polling.queue_interval, Duration::from_secs(3));
        assert_eq!(config.telemetry.reconnect_interval, Duration::from_secs(3));
    }
}
