use serde::Deserialize;

use super::client::ClientConfig;
use super::telemetry::{LoggingConfig, TelemetryConfig};
use super::throttle::ThrottleConfig;
use super::timeout::{KeepAliveConfig, PoolConfig, TimeoutConfig};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Upstream API settings (base URL, default headers)
    pub client: ClientConfig,
    /// Request admission (throttling/deduplication) settings
    #[serde(default)]
    pub throttle: ThrottleConfig,
    /// Timeout configuration
    #[serde(default)]
    pub timeout: TimeoutConfig,
    /// TCP keep-alive for upstream connections
    #[serde(default)]
    pub keep_alive: KeepAliveConfig,
    /// Connection pool tuning for the underlying HTTP client
    #[serde(default)]
    pub pool: PoolConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Telemetry configuration
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl Config {
    /// Configuration with every section at its default, pointed at `base_url`
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: ClientConfig {
                base_url: base_url.into(),
                auth_token: None,
                user_agent: None,
            },
            throttle: ThrottleConfig::default(),
            timeout: TimeoutConfig::default(),
            keep_alive: KeepAliveConfig::default(),
            pool: PoolConfig::default(),
            logging: LoggingConfig::default(),
            telemetry: TelemetryConfig::default(),
        }
    }
}
