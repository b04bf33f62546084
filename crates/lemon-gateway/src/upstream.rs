//! HTTP client for the Lemon API.
//!
//! Thin wrapper over `reqwest` that knows the upstream base URL, applies the
//! per-call timeout, and turns transport failures into
//! [`GatewayError::Unavailable`]. It never interprets upstream statuses; that
//! is the proxy's job.

use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::GatewayConfig;
use crate::credentials::TokenPair;
use crate::error::{GatewayError, Result};

/// Path prefix of the versioned Lemon API.
pub const API_PREFIX: &str = "/api/v1";

/// Upstream refresh endpoint.
pub const REFRESH_PATH: &str = "/api/v1/auth/refresh";

/// Upstream login endpoint.
pub const LOGIN_PATH: &str = "/api/v1/auth/login";

/// Upstream logout (refresh token revocation) endpoint.
pub const LOGOUT_PATH: &str = "/api/v1/auth/logout";

/// Upstream health endpoint (unversioned).
pub const HEALTH_PATH: &str = "/health";

/// A request to be sent upstream on behalf of the browser.
#[derive(Debug, Clone)]
pub struct ProxyRequest {
    /// Path relative to the upstream base URL, including any query string.
    pub path: String,
    pub method: Method,
    /// Caller-supplied headers. `Authorization` is always overwritten.
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

impl ProxyRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        Self {
            path: path.into(),
            method,
            headers,
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_header(mut self, name: header::HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

/// An upstream response, buffered so it can be relayed verbatim.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub content_type: Option<HeaderValue>,
    pub body: Bytes,
}

impl UpstreamResponse {
    async fn read(response: reqwest::Response) -> Result<Self> {
        let status = response.status();
        let content_type = response.headers().get(header::CONTENT_TYPE).cloned();
        let body = response.bytes().await?;
        Ok(Self {
            status,
            content_type,
            body,
        })
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == StatusCode::UNAUTHORIZED
    }

    /// Decode the body as JSON.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_slice(&self.body)
    }
}

impl IntoResponse for UpstreamResponse {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        if let Some(content_type) = self.content_type {
            response
                .headers_mut()
                .insert(header::CONTENT_TYPE, content_type);
        }
        response
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshResponse {
    access_token: Option<String>,
    refresh_token: Option<String>,
}

/// `Authorization` value for `access_token`, if it is a valid header value.
fn bearer(access_token: &str) -> Option<HeaderValue> {
    HeaderValue::from_str(&format!("Bearer {}", access_token)).ok()
}

/// Client for the Lemon API.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: Client,
    base_url: Option<Url>,
    timeout: Duration,
}

impl UpstreamClient {
    pub fn new(config: &GatewayConfig) -> Self {
        Self {
            http: Client::new(),
            base_url: config.base_url.clone(),
            timeout: config.timeout,
        }
    }

    /// The configured base URL, or a configuration error.
    pub fn base_url(&self) -> Result<&Url> {
        self.base_url.as_ref().ok_or(GatewayError::Configuration)
    }

    /// Build an absolute upstream URL for `path` (which may carry a query string).
    pub fn url(&self, path: &str) -> Result<String> {
        let base = self.base_url()?.as_str().trim_end_matches('/');
        Ok(format!("{}/{}", base, path.trim_start_matches('/')))
    }

    /// Send `request` upstream with a bearer credential.
    ///
    /// Caller headers are kept except `Authorization`, which is always set here.
    pub async fn send(&self, request: &ProxyRequest, access_token: &str) -> Result<UpstreamResponse> {
        let mut headers = request.headers.clone();
        let bearer = bearer(access_token).ok_or(GatewayError::Unauthenticated)?;
        headers.insert(header::AUTHORIZATION, bearer);

        self.execute(request.method.clone(), &request.path, headers, request.body.clone())
            .await
    }

    /// Send a request without credentials.
    pub async fn send_anonymous(&self, request: &ProxyRequest) -> Result<UpstreamResponse> {
        self.execute(
            request.method.clone(),
            &request.path,
            request.headers.clone(),
            request.body.clone(),
        )
        .await
    }

    async fn execute(
        &self,
        method: Method,
        path: &str,
        headers: HeaderMap,
        body: Option<Bytes>,
    ) -> Result<UpstreamResponse> {
        let url = self.url(path)?;

        let mut req = self
            .http
            .request(method.clone(), &url)
            .headers(headers)
            .timeout(self.timeout);
        if let Some(body) = body {
            req = req.body(body);
        }

        let response = req.send().await.map_err(|e| {
            tracing::warn!(method = %method, path = %path, error = %e, "Upstream request failed");
            GatewayError::from(e)
        })?;

        let response = UpstreamResponse::read(response).await?;
        tracing::debug!(
            method = %method,
            path = %path,
            status = %response.status.as_u16(),
            "Upstream responded"
        );
        Ok(response)
    }

    /// Exchange a refresh token for a new token pair.
    ///
    /// Returns `Ok(None)` without any network call when no refresh token is
    /// held, and `Ok(None)` when upstream rejects the token or answers with a
    /// body lacking an access token. A missing `refreshToken` in the answer
    /// keeps the current one. Only transport failures are errors.
    pub async fn refresh_tokens(&self, refresh_token: Option<&str>) -> Result<Option<TokenPair>> {
        let Some(refresh_token) = refresh_token.filter(|t| !t.is_empty()) else {
            tracing::debug!("No refresh token held, skipping refresh");
            return Ok(None);
        };

        let url = self.url(REFRESH_PATH)?;
        let response = self
            .http
            .post(&url)
            .json(&RefreshRequest { refresh_token })
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Token refresh request failed");
                GatewayError::from(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::info!(status = %status.as_u16(), "Token refresh rejected by upstream");
            return Ok(None);
        }

        let parsed: RefreshResponse = match response.json().await {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to parse refresh response");
                return Ok(None);
            }
        };

        let Some(access_token) = parsed.access_token.filter(|t| !t.is_empty()) else {
            tracing::warn!("Refresh response did not include an access token");
            return Ok(None);
        };
        if bearer(&access_token).is_none() {
            tracing::warn!("Refresh response carried an access token unusable as a header");
            return Ok(None);
        }

        let refresh_token = parsed
            .refresh_token
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| refresh_token.to_string());

        tracing::debug!("Token refresh succeeded");
        Ok(Some(TokenPair {
            access_token,
            refresh_token,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> UpstreamClient {
        UpstreamClient::new(&GatewayConfig::new(Some(Url::parse(base).unwrap())))
    }

    #[test]
    fn test_url_joins_path_and_query() {
        let client = client("https://lemon.example.com");
        assert_eq!(
            client.url("/api/v1/items?includeAll=true").unwrap(),
            "https://lemon.example.com/api/v1/items?includeAll=true"
        );
    }

    #[test]
    fn test_url_keeps_base_path_prefix() {
        let client = client("https://example.com/lemon/");
        assert_eq!(
            client.url("/health").unwrap(),
            "https://example.com/lemon/health"
        );
    }

    #[test]
    fn test_url_without_base_is_configuration_error() {
        let client = UpstreamClient::new(&GatewayConfig::default());
        assert!(matches!(
            client.url("/api/v1/me"),
            Err(GatewayError::Configuration)
        ));
    }

    #[tokio::test]
    async fn test_refresh_without_token_makes_no_call() {
        // Port 9 (discard) is never contacted: the call short-circuits.
        let client = client("http://127.0.0.1:9");
        assert!(client.refresh_tokens(None).await.unwrap().is_none());
        assert!(client.refresh_tokens(Some("")).await.unwrap().is_none());
    }

    #[test]
    fn test_bearer_rejects_control_characters() {
        assert_eq!(bearer("A1").unwrap(), "Bearer A1");
        assert!(bearer("bad\ntoken").is_none());
    }

    #[tokio::test]
    async fn test_upstream_response_passthrough() {
        let upstream = UpstreamResponse {
            status: StatusCode::FORBIDDEN,
            content_type: Some(HeaderValue::from_static("application/json")),
            body: Bytes::from_static(br#"{"success":false}"#),
        };
        let response = upstream.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], br#"{"success":false}"#);
    }
}
