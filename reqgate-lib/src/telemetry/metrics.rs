use opentelemetry::global;
use opentelemetry::metrics::{Counter, Gauge, Histogram, Meter};
use opentelemetry::KeyValue;
use opentelemetry_sdk::metrics::SdkMeterProvider;
use prometheus::Registry;
use std::fmt;
use std::sync::Arc;

use crate::config::TelemetryConfig;
use crate::error::{GateError, Result};

pub mod labels {
    pub const OUTCOME: &str = "outcome";
    pub const REASON: &str = "reason";
    pub const METHOD: &str = "method";
    pub const STATUS_CODE: &str = "status_code";
    pub const ERROR_TYPE: &str = "error_type";
}

pub mod values {
    pub const OUTCOME_ADMITTED: &str = "admitted";
    pub const OUTCOME_BYPASSED: &str = "bypassed";
    pub const OUTCOME_REJECTED: &str = "rejected";
}

#[derive(Clone)]
pub struct Metrics {
    // Admission metrics
    pub admissions_total: Counter<u64>,
    pub rejections_total: Counter<u64>,
    pub resolutions_total: Counter<u64>,
    pub gc_evictions_total: Counter<u64>,
    pub tracked_fingerprints: Gauge<u64>,

    // Transport metrics
    pub transport_requests_total: Counter<u64>,
    pub transport_errors_total: Counter<u64>,
    pub transport_duration_seconds: Histogram<f64>,
}

impl Metrics {
    pub fn new(meter: Meter) -> Self {
        Self {
            admissions_total: meter
                .u64_counter("reqgate_admissions_total")
                .with_description("Admission decisions by outcome (admitted, bypassed, rejected)")
                .build(),
            rejections_total: meter
                .u64_counter("reqgate_rejections_total")
                .with_description("Requests rejected before dispatch, by reason")
                .build(),
            resolutions_total: meter
                .u64_counter("reqgate_resolutions_total")
                .with_description("Throttle entries marked resolved on completion")
                .build(),
            gc_evictions_total: meter
                .u64_counter("reqgate_gc_evictions_total")
                .with_description("Resolved throttle entries evicted after the window elapsed")
                .build(),
            tracked_fingerprints: meter
                .u64_gauge("reqgate_tracked_fingerprints")
                .with_description("Fingerprints currently held in the throttle table")
                .build(),

            transport_requests_total: meter
                .u64_counter("reqgate_transport_requests_total")
                .with_description("Requests that completed at the transport, by method and status")
                .build(),
            transport_errors_total: meter
                .u64_counter("reqgate_transport_errors_total")
                .with_description("Transport failures by error type")
                .build(),
            transport_duration_seconds: meter
                .f64_histogram("reqgate_transport_duration_seconds")
                .with_description("Transport round-trip duration in seconds")
                .build(),
        }
    }

    pub fn record_admission(&self, outcome: &'static str) {
        self.admissions_total.add(1, &[KeyValue::new(labels::OUTCOME, outcome)]);
    }

    pub fn record_rejection(&self, reason: &'static str) {
        self.rejections_total.add(1, &[KeyValue::new(labels::REASON, reason)]);
    }

    pub fn record_resolution(&self) {
        self.resolutions_total.add(1, &[]);
    }

    pub fn record_gc_evictions(&self, count: u64) {
        if count > 0 {
            self.gc_evictions_total.add(count, &[]);
        }
    }

    pub fn record_tracked_fingerprints(&self, count: u64) {
        self.tracked_fingerprints.record(count, &[]);
    }

    pub fn record_transport_request(&self, method: &str, status_code: u16, duration: f64) {
        let method = KeyValue::new(labels::METHOD, method.to_string());
        self.transport_requests_total.add(
            1,
            &[method.clone(), KeyValue::new(labels::STATUS_CODE, i64::from(status_code))],
        );
        self.transport_duration_seconds.record(duration, &[method]);
    }

    pub fn record_transport_error(&self, error_type: &'static str) {
        self.transport_errors_total.add(1, &[KeyValue::new(labels::ERROR_TYPE, error_type)]);
    }
}

impl fmt::Debug for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Metrics").finish_non_exhaustive()
    }
}

/// Install a Prometheus-backed global meter provider.
///
/// The returned registry is what an embedding application scrapes.
pub fn init_metrics() -> Result<(Arc<Metrics>, Registry)> {
    let registry = Registry::default();

    let exporter = opentelemetry_prometheus::exporter()
        .with_registry(registry.clone())
        .build()
        .map_err(|e| GateError::Telemetry(format!("Failed to build Prometheus exporter: {e}")))?;

    let meter_provider = SdkMeterProvider::builder().with_reader(exporter).build();

    global::set_meter_provider(meter_provider);

    let meter = global::meter("reqgate");
    let metrics = Arc::new(Metrics::new(meter));

    Ok((metrics, registry))
}

/// [`init_metrics`] when `telemetry.metrics_enabled` is set, otherwise nothing.
pub fn init_metrics_from_config(
    telemetry: &TelemetryConfig,
) -> Result<Option<(Arc<Metrics>, Registry)>> {
    if !telemetry.metrics_enabled {
        return Ok(None);
    }
    init_metrics().map(Some)
}
