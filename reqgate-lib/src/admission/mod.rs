//! Request admission: throttling and deduplication of outgoing requests.
//!
//! # Policy
//!
//! For every outgoing request (unless it opted out):
//!
//! 1. resolved entries older than the throttle window are garbage collected;
//! 2. the request is fingerprinted;
//! 3. with no entry for the fingerprint the request is admitted and recorded
//!    as pending;
//! 4. an entry younger than the window rejects the request as *too frequent*,
//!    whether or not it is resolved;
//! 5. an older, unresolved entry rejects it as a *duplicate in flight*;
//! 6. an older, resolved entry is overwritten and the request admitted.
//!
//! When the request completes (success or transport error) its entry is
//! marked resolved. Rejections leave the table untouched.
//!
//! # Configuration
//!
//! ```toml
//! [throttle]
//! enabled = true
//! window_ms = 300
//! ```

mod clock;
mod controller;
mod guard;
mod table;

pub use clock::{Clock, ManualClock, SystemClock};
pub use controller::{Admission, AdmissionController};
pub use guard::CompletionGuard;
pub use table::{ThrottleEntry, ThrottleTable};
