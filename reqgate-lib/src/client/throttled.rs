use std::sync::Arc;
use std::time::Instant;
use tracing::warn;

use super::error::{ClientError, TransportError};
use super::hyper_transport::HyperTransport;
use super::response::TransportResponse;
use super::transport::Transport;
use crate::admission::{Admission, AdmissionController, CompletionGuard};
use crate::config::{validate_config, Config};
use crate::error::Result;
use crate::fingerprint::Value;
use crate::request::RequestDescriptor;
use crate::telemetry::Metrics;

/// HTTP client that consults an [`AdmissionController`] around every call.
///
/// Rejected requests fail with [`ClientError::Throttled`] before the
/// transport is touched. Dispatched requests are resolved when they finish,
/// fail, or are dropped mid-flight.
pub struct ThrottledClient<T> {
    transport: T,
    controller: Arc<AdmissionController>,
    metrics: Option<Arc<Metrics>>,
}

impl ThrottledClient<HyperTransport> {
    pub fn from_config(config: &Config, metrics: Option<Arc<Metrics>>) -> Result<Self> {
        validate_config(config)?;
        let transport = HyperTransport::from_config(config)?;
        let controller = Arc::new(AdmissionController::from_config(config, metrics.clone()));
        Ok(Self { transport, controller, metrics })
    }
}

impl<T: Transport> ThrottledClient<T> {
    pub fn new(transport: T, controller: Arc<AdmissionController>) -> Self {
        Self { transport, controller, metrics: None }
    }

    /// Record transport metrics (admission metrics belong to the controller)
    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn controller(&self) -> &Arc<AdmissionController> {
        &self.controller
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Admit, dispatch and resolve one request.
    pub async fn request(
        &self,
        request: RequestDescriptor,
    ) -> std::result::Result<TransportResponse, ClientError> {
        if let Admission::Rejected { rejection, .. } = self.controller.before_send(&request) {
            return Err(ClientError::throttled(rejection, request));
        }

        let guard = CompletionGuard::new(&self.controller, &request);
        let start = Instant::now();
        let outcome = self.transport.send(&request).await;
        let elapsed = start.elapsed().as_secs_f64();

        match outcome {
            Ok(response) => {
                guard.complete();
                if let Some(ref m) = self.metrics {
                    m.record_transport_request(
                        request.method.as_str(),
                        response.status.as_u16(),
                        elapsed,
                    );
                }
                Ok(response)
            }
            Err(failure) => {
                guard.disarm();
                warn!(
                    method = %request.method,
                    url = %request.url,
                    error = %failure,
                    "transport failure"
                );
                if let Some(ref m) = self.metrics {
                    m.record_transport_error(failure.error_type());
                }
                let error = ClientError::from(TransportError::new(request, failure));
                self.controller.after_error(&error);
                Err(error)
            }
        }
    }

    pub async fn get(
        &self,
        url: impl Into<String>,
    ) -> std::result::Result<TransportResponse, ClientError> {
        self.request(RequestDescriptor::get(url)).await
    }

    pub async fn post(
        &self,
        url: impl Into<String>,
        body: impl Into<Value>,
    ) -> std::result::Result<TransportResponse, ClientError> {
        self.request(RequestDescriptor::post(url).with_body(body)).await
    }

    pub async fn put(
        &self,
        url: impl Into<String>,
        body: impl Into<Value>,
    ) -> std::result::Result<TransportResponse, ClientError> {
        self.request(RequestDescriptor::put(url).with_body(body)).await
    }

    pub async fn patch(
        &self,
        url: impl Into<String>,
        body: impl Into<Value>,
    ) -> std::result::Result<TransportResponse, ClientError> {
        self.request(RequestDescriptor::patch(url).with_body(body)).await
    }

    pub async fn delete(
        &self,
        url: impl Into<String>,
    ) -> std::result::Result<TransportResponse, ClientError> {
        self.request(RequestDescriptor::delete(url)).await
    }
}
