use std::time::Duration;
use thiserror::Error;

use crate::request::RequestDescriptor;

/// Why the admission controller refused a request before dispatch
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rejection {
    /// An identical request was admitted less than one throttle window ago
    #[error("Too many requests")]
    TooFrequent,

    /// An identical request is still unresolved and the window has elapsed
    #[error("Repeated requests")]
    DuplicateInFlight,
}

impl Rejection {
    /// Metric/log label
    pub fn as_str(&self) -> &'static str {
        match self {
            Rejection::TooFrequent => "too_frequent",
            Rejection::DuplicateInFlight => "duplicate_in_flight",
        }
    }
}

/// Describes things that can go wrong inside a transport
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportFailure {
    #[error("Invalid URI: {0}")]
    InvalidUri(String),

    #[error("Failed to build request: {0}")]
    FailedToBuildRequest(String),

    #[error("Failed to get response: {0}")]
    FailedToGetResponse(String),

    #[error("Failed to read response body: {0}")]
    FailedToReadBody(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
}

impl TransportFailure {
    /// Metric/log label
    pub fn error_type(&self) -> &'static str {
        match self {
            TransportFailure::InvalidUri(_) => "invalid_uri",
            TransportFailure::FailedToBuildRequest(_) => "build_request",
            TransportFailure::FailedToGetResponse(_) => "connection",
            TransportFailure::FailedToReadBody(_) => "read_body",
            TransportFailure::Timeout(_) => "timeout",
        }
    }
}

/// A transport failure together with the request that caused it
#[derive(Debug, Error)]
#[error("{failure}")]
pub struct TransportError {
    request: Box<RequestDescriptor>,
    failure: TransportFailure,
}

impl TransportError {
    pub fn new(request: RequestDescriptor, failure: TransportFailure) -> Self {
        Self { request: Box::new(request), failure }
    }

    pub fn request(&self) -> &RequestDescriptor {
        &self.request
    }

    pub fn failure(&self) -> &TransportFailure {
        &self.failure
    }
}

/// Where a [`ClientError`] came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorOrigin {
    /// Refused by the admission controller; never reached the network
    ThrottleRejected,
    /// Raised by the transport after dispatch
    TransportFailed,
}

/// Error returned by [`crate::client::ThrottledClient`]
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{rejection}")]
    Throttled { rejection: Rejection, request: Box<RequestDescriptor> },

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl ClientError {
    pub fn throttled(rejection: Rejection, request: RequestDescriptor) -> Self {
        ClientError::Throttled { rejection, request: Box::new(request) }
    }

    pub fn origin(&self) -> ErrorOrigin {
        match self {
            ClientError::Throttled { .. } => ErrorOrigin::ThrottleRejected,
            ClientError::Transport(_) => ErrorOrigin::TransportFailed,
        }
    }

    pub fn is_throttled(&self) -> bool {
        self.origin() == ErrorOrigin::ThrottleRejected
    }

    pub fn rejection(&self) -> Option<Rejection> {
        match self {
            ClientError::Throttled { rejection, .. } => Some(*rejection),
            ClientError::Transport(_) => None,
        }
    }

    /// The request this error belongs to
    pub fn request(&self) -> &RequestDescriptor {
        match self {
            ClientError::Throttled { request, .. } => request,
            ClientError::Transport(err) => err.request(),
        }
    }
}
