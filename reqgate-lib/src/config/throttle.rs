use serde::Deserialize;
use std::time::Duration;

/// Request admission configuration
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ThrottleConfig {
    /// Enable throttling and deduplication of outgoing requests
    /// When false every request is admitted without bookkeeping
    /// Default: true
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Throttle window in milliseconds
    /// An identical request inside this window is rejected as too frequent,
    /// whether or not the earlier one has completed
    /// Default: 300
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,
}

impl ThrottleConfig {
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self { enabled: true, window_ms: default_window_ms() }
    }
}

fn default_true() -> bool {
    true
}

fn default_window_ms() -> u64 {
    300
}
