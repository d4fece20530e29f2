mod client;
mod loader;
mod root;
mod telemetry;
mod throttle;
mod timeout;

pub use client::ClientConfig;
pub use loader::{load_from_path, load_from_str, validate_config};
pub use root::Config;
pub use telemetry::{LoggingConfig, TelemetryConfig};
pub use throttle::ThrottleConfig;
pub use timeout::{KeepAliveConfig, PoolConfig, TimeoutConfig};
