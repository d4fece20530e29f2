use bytes::Bytes;
use http::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use http::{HeaderMap, Request};
use http_body_util::{BodyExt, Full};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use std::time::Duration;
use tracing::debug;

use super::error::TransportFailure;
use super::response::TransportResponse;
use super::transport::Transport;
use crate::config::{Config, KeepAliveConfig, PoolConfig};
use crate::error::{GateError, Result};
use crate::fingerprint::{wire_json, Value};
use crate::request::RequestDescriptor;

type HttpClient = Client<HttpConnector, Full<Bytes>>;

const CONTENT_TYPE_JSON: &str = "application/json";
const CONTENT_TYPE_TEXT: &str = "text/plain; charset=utf-8";

/// [`Transport`] over a pooled hyper-util client.
///
/// The client keeps idle connections per host, so consecutive requests to the
/// same API reuse TCP connections. Cloning is cheap and shares the pool.
#[derive(Clone)]
pub struct HyperTransport {
    client: HttpClient,
    base_url: String,
    default_headers: HeaderMap,
    request_timeout: Duration,
}

impl HyperTransport {
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = Self::create_client(
            &config.keep_alive,
            &config.pool,
            Duration::from_millis(config.timeout.connect_ms),
        );

        let mut default_headers = HeaderMap::new();
        if let Some(ref token) = config.client.auth_token {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| GateError::Config(format!("Invalid client.auth_token: {e}")))?;
            default_headers.insert(AUTHORIZATION, value);
        }
        if let Some(ref agent) = config.client.user_agent {
            let value = HeaderValue::from_str(agent)
                .map_err(|e| GateError::Config(format!("Invalid client.user_agent: {e}")))?;
            default_headers.insert(USER_AGENT, value);
        }

        Ok(Self {
            client,
            base_url: config.client.base_url.clone(),
            default_headers,
            request_timeout: Duration::from_millis(config.timeout.request_ms),
        })
    }

    fn create_client(
        keep_alive: &KeepAliveConfig,
        pool: &PoolConfig,
        connect_timeout: Duration,
    ) -> HttpClient {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(connect_timeout));
        if keep_alive.enabled {
            connector.set_keepalive(Some(Duration::from_secs(keep_alive.timeout_secs)));
        } else {
            connector.set_keepalive(None);
        }

        let mut builder = Client::builder(TokioExecutor::new());
        builder.pool_idle_timeout(Duration::from_secs(pool.idle_timeout));

        if pool.pool_max_idle_per_host > 0 {
            builder.pool_max_idle_per_host(pool.pool_max_idle_per_host);
        }

        builder.build(connector)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Turn a descriptor into the hyper request that goes on the wire.
    ///
    /// Per-request headers replace default headers of the same name.
    pub fn build_request(
        &self,
        request: &RequestDescriptor,
    ) -> std::result::Result<Request<Full<Bytes>>, TransportFailure> {
        let mut url = resolve_url(&self.base_url, &request.url);
        if let Some(ref query) = request.query {
            let query_string = encode_query(query);
            if !query_string.is_empty() {
                url.push(if url.contains('?') { '&' } else { '?' });
                url.push_str(&query_string);
            }
        }

        let uri = url
            .parse::<http::Uri>()
            .map_err(|e| TransportFailure::InvalidUri(format!("{url}: {e}")))?;

        let mut headers = self.default_headers.clone();
        let body = match request.body.as_ref().and_then(encode_body) {
            Some((bytes, content_type)) => {
                headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
                bytes
            }
            None => Bytes::new(),
        };
        headers.extend(request.headers.clone());

        let mut upstream = Request::builder()
            .method(request.method.clone())
            .uri(uri)
            .body(Full::new(body))
            .map_err(|e| TransportFailure::FailedToBuildRequest(e.to_string()))?;
        *upstream.headers_mut() = headers;

        Ok(upstream)
    }
}

impl Transport for HyperTransport {
    async fn send(
        &self,
        request: &RequestDescriptor,
    ) -> std::result::Result<TransportResponse, TransportFailure> {
        let upstream = self.build_request(request)?;
        debug!(method = %request.method, uri = %upstream.uri(), "dispatching request");

        let exchange = async {
            let response = self
                .client
                .request(upstream)
                .await
                .map_err(|e| TransportFailure::FailedToGetResponse(e.to_string()))?;
            let (parts, body) = response.into_parts();
            let body = body
                .collect()
                .await
                .map_err(|e| TransportFailure::FailedToReadBody(e.to_string()))?
                .to_bytes();
            Ok::<_, TransportFailure>(TransportResponse {
                status: parts.status,
                headers: parts.headers,
                body,
            })
        };

        tokio::time::timeout(self.request_timeout, exchange)
            .await
            .unwrap_or_else(|_| Err(TransportFailure::Timeout(self.request_timeout)))
    }
}

/// Resolve `target` against `base_url`.
///
/// Absolute http(s) targets are returned unchanged; relative ones are joined
/// with exactly one `/` between base and path.
pub fn resolve_url(base_url: &str, target: &str) -> String {
    if target.starts_with("http://") || target.starts_with("https://") {
        return target.to_string();
    }
    if target.is_empty() {
        return base_url.to_string();
    }
    format!("{}/{}", base_url.trim_end_matches('/'), target.trim_start_matches('/'))
}

/// Encode a query payload as `k=v&k=v`.
///
/// Objects map member by member (arrays repeat the key, undefined and null
/// members are skipped); a string payload is used as an already-encoded query.
pub fn encode_query(query: &Value) -> String {
    match query {
        Value::Object(node) => {
            let members = node.read().clone();
            let mut pairs = Vec::with_capacity(members.len());
            for (key, member) in &members {
                match member {
                    Value::Array(items) => {
                        let items = items.read().clone();
                        pairs.extend(
                            items.iter().filter_map(query_scalar).map(|v| query_pair(key, &v)),
                        );
                    }
                    other => {
                        if let Some(v) = query_scalar(other) {
                            pairs.push(query_pair(key, &v));
                        }
                    }
                }
            }
            pairs.join("&")
        }
        Value::String(s) => s.trim_start_matches('?').to_string(),
        other => query_scalar(other).unwrap_or_default(),
    }
}

fn query_pair(key: &str, value: &str) -> String {
    format!("{}={}", urlencoding::encode(key), urlencoding::encode(value))
}

fn query_scalar(value: &Value) -> Option<String> {
    match value {
        Value::Undefined | Value::Null => None,
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::BigInt(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        nested => Some(wire_json(nested)),
    }
}

fn encode_body(body: &Value) -> Option<(Bytes, &'static str)> {
    match body {
        Value::Undefined => None,
        Value::String(s) => Some((Bytes::from(s.clone()), CONTENT_TYPE_TEXT)),
        other => Some((Bytes::from(wire_json(other)), CONTENT_TYPE_JSON)),
    }
}
