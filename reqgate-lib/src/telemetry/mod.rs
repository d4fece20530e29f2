pub mod metrics;
pub mod tracing;

pub use metrics::{init_metrics, init_metrics_from_config, labels, values, Metrics};
pub use tracing::{init_tracing, init_tracing_from_config};
