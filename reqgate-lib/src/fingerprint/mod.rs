//! Request fingerprinting.
//!
//! A fingerprint identifies a *logical* request: two descriptors with the same
//! method, the same normalized path and structurally equal query and body
//! produce the same fingerprint, whatever order their object keys were
//! inserted in.

mod path;
mod serialize;
mod value;

pub use path::{collapse_slashes, normalize_path};
pub use serialize::{serialize_payload, stable_json, to_json, wire_json, CIRCULAR_SENTINEL};
pub use value::{Node, Value, MAX_SAFE_INTEGER};

use std::fmt;

use crate::request::RequestDescriptor;

/// Identity string of a logical request
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Fingerprint {
    fn from(raw: String) -> Self {
        Fingerprint(raw)
    }
}

impl From<&str> for Fingerprint {
    fn from(raw: &str) -> Self {
        Fingerprint(raw.to_string())
    }
}

impl AsRef<str> for Fingerprint {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Builds fingerprints relative to a base URL.
#[derive(Debug, Clone, Default)]
pub struct FingerprintBuilder {
    base_url: String,
}

impl FingerprintBuilder {
    /// `base_url` is stripped from absolute targets before hashing them
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into() }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `METHOD:path:body` followed directly by the serialized query.
    pub fn fingerprint(&self, request: &RequestDescriptor) -> Fingerprint {
        let path = normalize_path(&request.url, &self.base_url);
        let body = serialize_payload(request.body.as_ref());
        let query = serialize_payload(request.query.as_ref());
        Fingerprint(format!("{}:{}:{}{}", request.method.as_str(), path, body, query))
    }
}
