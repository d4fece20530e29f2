use http::header::{HeaderName, HeaderValue};
use http::{HeaderMap, Method};
use tracing::debug;

use crate::fingerprint::Value;

/// Everything needed to issue (and fingerprint) one outgoing request.
///
/// `url` is either a path relative to the client's base URL or an absolute
/// URL. Headers take part in dispatch only; they are not fingerprinted.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub method: Method,
    pub url: String,
    pub query: Option<Value>,
    pub body: Option<Value>,
    pub headers: HeaderMap,
    /// Per-request opt-out: when false the admission controller lets the
    /// request through without consulting the throttle table
    pub throttle: bool,
}

impl RequestDescriptor {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            query: None,
            body: None,
            headers: HeaderMap::new(),
            throttle: true,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn put(url: impl Into<String>) -> Self {
        Self::new(Method::PUT, url)
    }

    pub fn patch(url: impl Into<String>) -> Self {
        Self::new(Method::PATCH, url)
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(Method::DELETE, url)
    }

    pub fn with_body(mut self, body: impl Into<Value>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_query(mut self, query: impl Into<Value>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Add one query parameter.
    ///
    /// A query that is not an object (e.g. a raw `"a=1&b=2"` string set with
    /// [`Self::with_query`]) is replaced by a new object holding only this
    /// parameter.
    pub fn with_query_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let query = match self.query.take() {
            Some(existing @ Value::Object(_)) => existing,
            Some(replaced) => {
                debug!(query = ?replaced, "replacing non-object query with query parameters");
                Value::object()
            }
            None => Value::object(),
        };
        query.insert(key, value);
        self.query = Some(query);
        self
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Skip throttling for this request only
    pub fn without_throttle(mut self) -> Self {
        self.throttle = false;
        self
    }
}
