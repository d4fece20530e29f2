use ahash::AHashMap;
use std::time::{Duration, Instant};

use crate::client::Rejection;
use crate::fingerprint::Fingerprint;

/// Bookkeeping for one fingerprint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThrottleEntry {
    /// False while the admitted request has not completed
    pub resolved: bool,
    /// When the request holding this entry was admitted
    pub timestamp: Instant,
}

impl ThrottleEntry {
    fn pending(now: Instant) -> Self {
        Self { resolved: false, timestamp: now }
    }

    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.timestamp)
    }
}

/// Fingerprint → entry map with the admission policy on top.
///
/// The table holds at most one entry per fingerprint. Unresolved entries are
/// never evicted, however old they are.
#[derive(Debug, Default)]
pub struct ThrottleTable {
    entries: AHashMap<Fingerprint, ThrottleEntry>,
}

impl ThrottleTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, fingerprint: &Fingerprint) -> Option<&ThrottleEntry> {
        self.entries.get(fingerprint)
    }

    /// Drop resolved entries at least `window` old. Returns how many went.
    pub fn collect_garbage(&mut self, now: Instant, window: Duration) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !(entry.resolved && entry.age(now) >= window));
        before.saturating_sub(self.entries.len())
    }

    /// Decide whether `fingerprint` may be dispatched at `now`.
    ///
    /// The window check wins over the in-flight check. On admission the entry
    /// is (re)set to pending at `now`; on rejection it is left untouched.
    pub fn try_admit(
        &mut self,
        fingerprint: &Fingerprint,
        now: Instant,
        window: Duration,
    ) -> Result<(), Rejection> {
        if let Some(entry) = self.entries.get(fingerprint) {
            if entry.age(now) < window {
                return Err(Rejection::TooFrequent);
            }
            if !entry.resolved {
                return Err(Rejection::DuplicateInFlight);
            }
        }

        self.entries.insert(fingerprint.clone(), ThrottleEntry::pending(now));
        Ok(())
    }

    /// Mark `fingerprint` resolved, keeping its timestamp.
    ///
    /// Returns false when there is no entry for it.
    pub fn resolve(&mut self, fingerprint: &Fingerprint) -> bool {
        match self.entries.get_mut(fingerprint) {
            Some(entry) => {
                entry.resolved = true;
                true
            }
            None => false,
        }
    }
}
