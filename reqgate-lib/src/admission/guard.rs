use tracing::debug;

use super::controller::AdmissionController;
use crate::request::RequestDescriptor;

/// Runs the post-dispatch hook exactly once for a dispatched request.
///
/// If the guard is dropped while still armed (the request future was
/// cancelled mid-flight) the hook runs on drop, so the throttle entry cannot
/// be left unresolved forever.
pub struct CompletionGuard<'a> {
    controller: &'a AdmissionController,
    request: &'a RequestDescriptor,
    armed: bool,
}

impl<'a> CompletionGuard<'a> {
    pub fn new(controller: &'a AdmissionController, request: &'a RequestDescriptor) -> Self {
        Self { controller, request, armed: true }
    }

    /// Request finished; resolve its entry now
    pub fn complete(mut self) {
        self.fire();
    }

    /// Hand resolution over to the caller (e.g. `after_error`)
    pub fn disarm(mut self) {
        self.armed = false;
    }

    fn fire(&mut self) {
        if self.armed {
            self.armed = false;
            self.controller.after_complete(self.request);
        }
    }
}

impl Drop for CompletionGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            debug!(
                method = %self.request.method,
                url = %self.request.url,
                "request dropped before completion"
            );
            self.fire();
        }
    }
}
