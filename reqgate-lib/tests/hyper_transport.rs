use std::convert::Infallible;
use std::net::SocketAddr;
use std::time::Duration;

use bytes::Bytes;
use http::header::{HeaderName, HeaderValue};
use http_body_util::{BodyExt, Full};
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use reqgate_lib::config::Config;
use reqgate_lib::{
    ClientError, HyperTransport, RequestDescriptor, ThrottledClient, Transport, TransportFailure,
    Value,
};
use serde_json::{json, Value as Json};
use tokio::net::TcpListener;

/// Start a backend that describes each request it receives as JSON.
///
/// Requests to `/slow` are answered after two seconds.
async fn start_echo_backend() -> Result<SocketAddr, Box<dyn std::error::Error + Send + Sync>> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                break;
            };
            tokio::spawn(async move {
                let svc = service_fn(|req: Request<hyper::body::Incoming>| async move {
                    if req.uri().path() == "/slow" {
                        tokio::time::sleep(Duration::from_secs(2)).await;
                    }
                    let header = |name: &str| {
                        req.headers().get(name).and_then(|v| v.to_str().ok()).map(str::to_string)
                    };
                    let described = json!({
                        "method": req.method().as_str(),
                        "path": req.uri().path(),
                        "query": req.uri().query(),
                        "content_type": header("content-type"),
                        "authorization": header("authorization"),
                        "user_agent": header("user-agent"),
                        "custom": header("x-custom"),
                    });
                    let body = req
                        .into_body()
                        .collect()
                        .await
                        .map(|collected| collected.to_bytes())
                        .unwrap_or_default();
                    let mut described = described;
                    described["body"] = Json::String(String::from_utf8_lossy(&body).into_owned());

                    let mut resp = Response::new(Full::new(Bytes::from(described.to_string())));
                    if described["path"] == "/missing" {
                        *resp.status_mut() = http::StatusCode::NOT_FOUND;
                    }
                    Ok::<_, Infallible>(resp)
                });
                let _ = ConnBuilder::new(TokioExecutor::new())
                    .serve_connection(TokioIo::new(stream), svc)
                    .await;
            });
        }
    });

    Ok(addr)
}

fn config_for(addr: SocketAddr) -> Config {
    let mut config = Config::with_base_url(format!("http://{addr}/api/"));
    config.client.auth_token = Some("secret".to_string());
    config.client.user_agent = Some("reqgate-test".to_string());
    config
}

#[tokio::test]
async fn test_get_with_query_and_default_headers(
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let addr = start_echo_backend().await?;
    let transport = HyperTransport::from_config(&config_for(addr))?;

    let request = RequestDescriptor::get("/blocks")
        .with_query_param("limit", 10)
        .with_query_param("tag", vec!["a b", "c"]);
    let response = transport.send(&request).await?;
    assert!(response.is_success());

    let echoed: Json = response.json()?;
    assert_eq!(echoed["method"], "GET");
    assert_eq!(echoed["path"], "/api/blocks");
    assert_eq!(echoed["query"], "limit=10&tag=a%20b&tag=c");
    assert_eq!(echoed["authorization"], "Bearer secret");
    assert_eq!(echoed["user_agent"], "reqgate-test");
    assert_eq!(echoed["body"], "");
    Ok(())
}

#[tokio::test]
async fn test_post_json_body() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let addr = start_echo_backend().await?;
    let transport = HyperTransport::from_config(&config_for(addr))?;

    let request = RequestDescriptor::post("tx")
        .with_body(json!({"b": 2, "a": 1}))
        .with_header(HeaderName::from_static("x-custom"), HeaderValue::from_static("yes"))
        .with_header(http::header::USER_AGENT, HeaderValue::from_static("override"));
    let echoed: Json = transport.send(&request).await?.json()?;

    assert_eq!(echoed["method"], "POST");
    assert_eq!(echoed["path"], "/api/tx");
    assert_eq!(echoed["content_type"], "application/json");
    assert_eq!(echoed["body"], r#"{"a":1,"b":2}"#);
    assert_eq!(echoed["custom"], "yes");
    assert_eq!(echoed["user_agent"], "override");
    Ok(())
}

#[tokio::test]
async fn test_integer_body_sent_as_numbers() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let addr = start_echo_backend().await?;
    let transport = HyperTransport::from_config(&config_for(addr))?;

    let body: Value = [("amount", Value::from(100_i64)), ("supply", Value::from(u64::MAX))]
        .into_iter()
        .collect();
    let echoed: Json = transport.send(&RequestDescriptor::post("/tx").with_body(body)).await?.json()?;

    assert_eq!(echoed["body"], r#"{"amount":100,"supply":18446744073709551615}"#);
    Ok(())
}

#[tokio::test]
async fn test_string_body_sent_as_text() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let addr = start_echo_backend().await?;
    let transport = HyperTransport::from_config(&config_for(addr))?;

    let request = RequestDescriptor::put("/raw").with_body("hello");
    let echoed: Json = transport.send(&request).await?.json()?;

    assert_eq!(echoed["content_type"], "text/plain; charset=utf-8");
    assert_eq!(echoed["body"], "hello");
    Ok(())
}

#[tokio::test]
async fn test_error_status_is_a_response() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let addr = start_echo_backend().await?;
    let transport = HyperTransport::from_config(&config_for(addr))?;

    let response = transport.send(&RequestDescriptor::get(format!("http://{addr}/missing"))).await?;
    assert_eq!(response.status, http::StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn test_request_timeout() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let addr = start_echo_backend().await?;
    let mut config = config_for(addr);
    config.timeout.request_ms = 100;
    let transport = HyperTransport::from_config(&config)?;

    let result = transport.send(&RequestDescriptor::get(format!("http://{addr}/slow"))).await;
    assert_eq!(result.err(), Some(TransportFailure::Timeout(Duration::from_millis(100))));
    Ok(())
}

#[tokio::test]
async fn test_connection_refused() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Bind then drop to get a port nobody listens on
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
        listener.local_addr()?.port()
    };
    let transport = HyperTransport::from_config(&Config::with_base_url(format!("http://127.0.0.1:{port}")))?;

    let result = transport.send(&RequestDescriptor::get("/blocks")).await;
    assert!(matches!(result, Err(TransportFailure::FailedToGetResponse(_))));
    Ok(())
}

#[tokio::test]
async fn test_rejects_invalid_auth_token() {
    let mut config = Config::with_base_url("http://127.0.0.1:8080");
    config.client.auth_token = Some("bad\ntoken".to_string());
    assert!(HyperTransport::from_config(&config).is_err());
}

#[tokio::test]
async fn test_throttled_client_end_to_end() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let addr = start_echo_backend().await?;
    let mut config = config_for(addr);
    config.throttle.window_ms = 60_000;
    let client = ThrottledClient::from_config(&config, None)?;

    let echoed: Json = client.get("/blocks").await?.json()?;
    assert_eq!(echoed["path"], "/api/blocks");

    // Absolute form of the same request is fingerprinted identically
    let again = client.get(format!("http://{addr}/api/blocks")).await;
    assert!(matches!(again, Err(ClientError::Throttled { .. })));
    Ok(())
}
