#![forbid(unsafe_code)]

pub mod admission;
pub mod client;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod request;
pub mod telemetry;

pub use admission::{Admission, AdmissionController, Clock, ManualClock, SystemClock};
pub use client::{
    ClientError, ErrorOrigin, HyperTransport, Rejection, ThrottledClient, Transport,
    TransportFailure, TransportResponse,
};
pub use config::{load_from_path, load_from_str, Config};
pub use error::{GateError, Result};
pub use fingerprint::{Fingerprint, FingerprintBuilder, Value};
pub use request::RequestDescriptor;
