use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, warn};

use super::clock::{Clock, SystemClock};
use super::table::{ThrottleEntry, ThrottleTable};
use crate::client::{ClientError, Rejection};
use crate::config::Config;
use crate::fingerprint::{Fingerprint, FingerprintBuilder};
use crate::request::RequestDescriptor;
use crate::telemetry::{values, Metrics};

/// Outcome of the pre-dispatch hook
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// Recorded in the table as pending; go ahead and dispatch
    Admitted { fingerprint: Fingerprint },
    /// Throttling skipped (per-request opt-out or globally disabled)
    Bypassed,
    /// Refused before dispatch
    Rejected { fingerprint: Fingerprint, rejection: Rejection },
}

impl Admission {
    /// Returns true if the request may be dispatched.
    pub fn is_allowed(&self) -> bool {
        !self.is_rejected()
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Admission::Rejected { .. })
    }

    pub fn rejection(&self) -> Option<Rejection> {
        match self {
            Admission::Rejected { rejection, .. } => Some(*rejection),
            _ => None,
        }
    }

    /// Returns the fingerprint when one was computed.
    pub fn fingerprint(&self) -> Option<&Fingerprint> {
        match self {
            Admission::Admitted { fingerprint } | Admission::Rejected { fingerprint, .. } => {
                Some(fingerprint)
            }
            Admission::Bypassed => None,
        }
    }
}

/// Gates outgoing requests by how recently an identical request was seen.
///
/// Every hook takes the table lock for its whole read-check-write sequence, so
/// two concurrent admissions of the same fingerprint can never both find the
/// table empty. Network calls happen outside the lock.
///
/// # Example
/// ```ignore
/// use reqgate_lib::{AdmissionController, FingerprintBuilder, RequestDescriptor};
/// use std::time::Duration;
///
/// let controller = AdmissionController::new(
///     FingerprintBuilder::new("http://node:3000"),
///     Duration::from_millis(300),
/// );
/// let request = RequestDescriptor::get("/blocks");
///
/// assert!(controller.before_send(&request).is_allowed());
/// assert!(controller.before_send(&request).is_rejected());
/// controller.after_complete(&request);
/// ```
#[derive(Debug)]
pub struct AdmissionController {
    table: Mutex<ThrottleTable>,
    builder: FingerprintBuilder,
    window: Duration,
    enabled: bool,
    clock: Arc<dyn Clock>,
    metrics: Option<Arc<Metrics>>,
}

impl AdmissionController {
    /// Enabled controller on the system clock
    pub fn new(builder: FingerprintBuilder, window: Duration) -> Self {
        Self {
            table: Mutex::new(ThrottleTable::new()),
            builder,
            window,
            enabled: true,
            clock: Arc::new(SystemClock),
            metrics: None,
        }
    }

    pub fn from_config(config: &Config, metrics: Option<Arc<Metrics>>) -> Self {
        let mut controller = Self::new(
            FingerprintBuilder::new(config.client.base_url.clone()),
            config.throttle.window(),
        )
        .with_enabled(config.throttle.enabled);
        controller.metrics = metrics;
        controller
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn fingerprint(&self, request: &RequestDescriptor) -> Fingerprint {
        self.builder.fingerprint(request)
    }

    /// Pre-dispatch hook.
    ///
    /// Runs garbage collection, then applies the admission policy to the
    /// request's fingerprint. Opted-out requests skip both steps.
    pub fn before_send(&self, request: &RequestDescriptor) -> Admission {
        if !self.enabled || !request.throttle {
            debug!(method = %request.method, url = %request.url, "throttling bypassed");
            self.record_outcome(values::OUTCOME_BYPASSED);
            return Admission::Bypassed;
        }

        let now = self.clock.now();
        let fingerprint = self.builder.fingerprint(request);

        let mut table = self.lock_table();
        let evicted = table.collect_garbage(now, self.window);
        let decision = table.try_admit(&fingerprint, now, self.window);
        let tracked = table.len();
        drop(table);

        if evicted > 0 {
            debug!(evicted, tracked, "evicted stale throttle entries");
        }
        if let Some(ref m) = self.metrics {
            m.record_gc_evictions(evicted as u64);
            m.record_tracked_fingerprints(tracked as u64);
        }

        match decision {
            Ok(()) => {
                debug!(method = %request.method, url = %request.url, "request admitted");
                self.record_outcome(values::OUTCOME_ADMITTED);
                Admission::Admitted { fingerprint }
            }
            Err(rejection) => {
                warn!(
                    method = %request.method,
                    url = %request.url,
                    reason = rejection.as_str(),
                    "request rejected by throttle"
                );
                self.record_outcome(values::OUTCOME_REJECTED);
                if let Some(ref m) = self.metrics {
                    m.record_rejection(rejection.as_str());
                }
                Admission::Rejected { fingerprint, rejection }
            }
        }
    }

    /// Post-dispatch hook for a request that completed (any status).
    ///
    /// Marks the request's fingerprint resolved without touching its
    /// timestamp. Returns whether an entry was found.
    pub fn after_complete(&self, request: &RequestDescriptor) -> bool {
        if !self.enabled {
            return false;
        }

        let fingerprint = self.builder.fingerprint(request);
        let resolved = self.lock_table().resolve(&fingerprint);

        if resolved {
            debug!(method = %request.method, url = %request.url, "throttle entry resolved");
            if let Some(ref m) = self.metrics {
                m.record_resolution();
            }
        }
        resolved
    }

    /// Post-dispatch hook for the error path.
    ///
    /// Admission rejections never reached dispatch and are left alone; transport
    /// errors resolve the request they carry.
    pub fn after_error(&self, error: &ClientError) -> bool {
        match error {
            ClientError::Throttled { .. } => false,
            ClientError::Transport(err) => self.after_complete(err.request()),
        }
    }

    /// Snapshot of the entry for `fingerprint`
    pub fn entry(&self, fingerprint: &Fingerprint) -> Option<ThrottleEntry> {
        self.lock_table().get(fingerprint).copied()
    }

    /// Number of fingerprints currently tracked
    pub fn len(&self) -> usize {
        self.lock_table().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock_table().is_empty()
    }

    fn lock_table(&self) -> MutexGuard<'_, ThrottleTable> {
        self.table.lock().unwrap_or_else(|poisoned| {
            warn!("Throttle table lock poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn record_outcome(&self, outcome: &'static str) {
        if let Some(ref m) = self.metrics {
            m.record_admission(outcome);
        }
    }
}
