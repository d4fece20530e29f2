//! Shared test helpers: temp paths and scripted transports

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use http::StatusCode;
use reqgate_lib::{RequestDescriptor, Transport, TransportFailure, TransportResponse};
use tokio::sync::Notify;

/// Generate a temporary file path for testing
pub fn tmp_path(name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_else(|_| Duration::from_secs(0))
        .as_nanos();
    std::env::temp_dir().join(format!("reqgate-{nanos}-{name}.toml"))
}

/// Answers every request with a fixed status, or a fixed failure, and keeps
/// the urls it saw.
#[derive(Debug)]
pub struct ScriptedTransport {
    status: StatusCode,
    failure: Option<TransportFailure>,
    seen: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    pub fn ok() -> Self {
        Self::with_status(StatusCode::OK)
    }

    pub fn with_status(status: StatusCode) -> Self {
        Self { status, failure: None, seen: Mutex::new(Vec::new()) }
    }

    pub fn failing(failure: TransportFailure) -> Self {
        Self { status: StatusCode::OK, failure: Some(failure), seen: Mutex::new(Vec::new()) }
    }

    pub fn calls(&self) -> usize {
        self.seen.lock().map(|seen| seen.len()).unwrap_or(0)
    }

    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().map(|seen| seen.clone()).unwrap_or_default()
    }
}

impl Transport for ScriptedTransport {
    async fn send(
        &self,
        request: &RequestDescriptor,
    ) -> Result<TransportResponse, TransportFailure> {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(format!("{} {}", request.method, request.url));
        }
        match self.failure {
            Some(ref failure) => Err(failure.clone()),
            None => Ok(TransportResponse::new(self.status, "ok")),
        }
    }
}

/// Holds every request until [`GatedTransport::release`] is called
#[derive(Debug, Default)]
pub struct GatedTransport {
    gate: Notify,
    started: AtomicUsize,
}

impl GatedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Let one waiting (or the next) request through
    pub fn release(&self) {
        self.gate.notify_one();
    }

    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }
}

impl Transport for GatedTransport {
    async fn send(
        &self,
        _request: &RequestDescriptor,
    ) -> Result<TransportResponse, TransportFailure> {
        self.started.fetch_add(1, Ordering::SeqCst);
        self.gate.notified().await;
        Ok(TransportResponse::new(StatusCode::OK, "released"))
    }
}

/// Never answers
#[derive(Debug, Default)]
pub struct StalledTransport;

impl Transport for StalledTransport {
    async fn send(
        &self,
        _request: &RequestDescriptor,
    ) -> Result<TransportResponse, TransportFailure> {
        std::future::pending().await
    }
}
