use std::future::Future;
use std::sync::Arc;

use super::error::TransportFailure;
use super::response::TransportResponse;
use crate::request::RequestDescriptor;

/// Capability to put a request on the wire.
///
/// Any HTTP status counts as a completed request; only failures to obtain a
/// response at all are errors.
pub trait Transport: Send + Sync {
    fn send(
        &self,
        request: &RequestDescriptor,
    ) -> impl Future<Output = Result<TransportResponse, TransportFailure>> + Send;
}

impl<T: Transport> Transport for Arc<T> {
    fn send(
        &self,
        request: &RequestDescriptor,
    ) -> impl Future<Output = Result<TransportResponse, TransportFailure>> + Send {
        (**self).send(request)
    }
}
