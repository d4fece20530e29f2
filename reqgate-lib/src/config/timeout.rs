use serde::Deserialize;

/// Timeout configuration
#[derive(Debug, Deserialize, Clone)]
pub struct TimeoutConfig {
    /// Connection timeout in milliseconds
    /// Default: 5000 (5 seconds)
    #[serde(default = "default_connect_timeout")]
    pub connect_ms: u64,
    /// Total request timeout in milliseconds (send + receive the full body)
    /// Default: 30000 (30 seconds)
    #[serde(default = "default_request_timeout")]
    pub request_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { connect_ms: default_connect_timeout(), request_ms: default_request_timeout() }
    }
}

/// TCP keep-alive configuration for upstream connections
#[derive(Debug, Deserialize, Clone)]
pub struct KeepAliveConfig {
    /// Send TCP keep-alive probes on idle pooled connections
    /// Default: true
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Keep-alive interval in seconds
    /// Default: 60 seconds
    #[serde(default = "default_keep_alive_timeout")]
    pub timeout_secs: u64,
}

impl Default for KeepAliveConfig {
    fn default() -> Self {
        Self { enabled: true, timeout_secs: default_keep_alive_timeout() }
    }
}

/// Connection pool configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PoolConfig {
    /// Seconds an idle pooled connection is kept before being closed
    /// Default: 90
    #[serde(default = "default_pool_idle_timeout")]
    pub idle_timeout: u64,
    /// Maximum idle connections kept per host
    /// 0 keeps the hyper-util default (unbounded)
    /// Default: 0
    #[serde(default)]
    pub pool_max_idle_per_host: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self { idle_timeout: default_pool_idle_timeout(), pool_max_idle_per_host: 0 }
    }
}

fn default_connect_timeout() -> u64 {
    5000
}

fn default_request_timeout() -> u64 {
    30000
}

fn default_true() -> bool {
    true
}

fn default_keep_alive_timeout() -> u64 {
    60
}

fn default_pool_idle_timeout() -> u64 {
    90
}
