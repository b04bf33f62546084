//! Common test utilities for gateway integration tests.

#![allow(dead_code)]

use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, header};
use lemon_gateway::{CookiePolicy, GatewayConfig, Server, ServerConfig};
use tower::ServiceExt;
use url::Url;
use wiremock::MockServer;

/// Router whose upstream is the given mock server.
pub fn router_for(upstream: &MockServer) -> Router {
    router_with_base(Some(Url::parse(&upstream.uri()).unwrap()), Duration::from_secs(5))
}

/// Router with an explicit base URL and upstream timeout.
pub fn router_with_base(base_url: Option<Url>, timeout: Duration) -> Router {
    let gateway = GatewayConfig::new(base_url).with_timeout(timeout);
    let config = ServerConfig::default()
        .with_cookie_policy(CookiePolicy::default())
        .with_request_logging(false);
    Server::new(gateway, config).router()
}

/// A base URL on which nothing is listening.
pub async fn unreachable_base_url() -> Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    Url::parse(&format!("http://{}", addr)).unwrap()
}

/// Send one request through the router.
pub async fn send(
    router: Router,
    method: &str,
    uri: &str,
    cookies: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookies) = cookies {
        builder = builder.header(header::COOKIE, cookies);
    }
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(serde_json::to_vec(&json).unwrap())
        }
        None => Body::empty(),
    };
    router.oneshot(builder.body(body).unwrap()).await.unwrap()
}

/// Decode a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// All `Set-Cookie` header values on a response.
pub fn set_cookies(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}

/// Value of the `Set-Cookie` for `name`, if any.
pub fn cookie_value(cookies: &[String], name: &str) -> Option<String> {
    let prefix = format!("{}=", name);
    cookies.iter().find_map(|c| {
        c.strip_prefix(&prefix)
            .map(|rest| rest.split(';').next().unwrap_or_default().to_string())
    })
}

/// Paths of the requests the mock server received, in order.
pub async fn received_paths(upstream: &MockServer) -> Vec<String> {
    upstream
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|r| r.url.path().to_string())
        .collect()
}
