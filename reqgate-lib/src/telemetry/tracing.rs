use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Registry};

use crate::config::LoggingConfig;
use crate::error::{GateError, Result};

/// Install the global tracing subscriber.
///
/// RUST_LOG, when set, overrides `log_level`.
pub fn init_tracing(log_level: &str, show_target: bool) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    let fmt_layer = tracing_subscriber::fmt::layer().with_target(show_target);

    let subscriber = Registry::default().with(env_filter).with(fmt_layer);

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| GateError::Telemetry(format!("Failed to set global tracing subscriber: {e}")))
}

pub fn init_tracing_from_config(logging: &LoggingConfig) -> Result<()> {
    init_tracing(&logging.level, logging.show_target)
}
