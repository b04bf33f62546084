//! Error types for the gateway.
//!
//! Every failure is resolved into a response at the gateway boundary using
//! the same envelope the Lemon API uses for its own errors:
//! `{ "success": false, "error": { "message": ..., "code": ... } }`.
//! Upstream-produced errors never pass through this type; they are returned
//! verbatim as [`UpstreamResponse`](crate::upstream::UpstreamResponse)s.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Result type alias for gateway operations.
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Gateway error taxonomy.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// No upstream base URL is configured.
    #[error("API base URL not configured")]
    Configuration,

    /// No usable credential, and a refresh was unavailable or failed.
    #[error("Not authenticated")]
    Unauthenticated,

    /// The upstream could not be reached (connect failure, timeout, broken body).
    #[error("Failed to connect to Lemon API: {0}")]
    Unavailable(String),
}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        GatewayError::Unavailable(e.to_string())
    }
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::Configuration => StatusCode::INTERNAL_SERVER_ERROR,
            GatewayError::Unauthenticated => StatusCode::UNAUTHORIZED,
            GatewayError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn code(&self) -> Option<&'static str> {
        match self {
            GatewayError::Configuration => Some("CONFIGURATION_ERROR"),
            GatewayError::Unauthenticated => Some("UNAUTHORIZED"),
            GatewayError::Unavailable(_) => None,
        }
    }

    /// Message shown to the browser. Transport details stay in the logs.
    fn public_message(&self) -> &'static str {
        match self {
            GatewayError::Configuration => "API base URL not configured",
            GatewayError::Unauthenticated => "Not authenticated",
            GatewayError::Unavailable(_) => "Failed to connect to Lemon API",
        }
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();

        match &self {
            GatewayError::Configuration => {
                tracing::error!(status = %status.as_u16(), "Upstream base URL is not configured");
            }
            GatewayError::Unavailable(detail) => {
                tracing::error!(status = %status.as_u16(), error = %detail, "Upstream unavailable");
            }
            GatewayError::Unauthenticated => {
                tracing::debug!(status = %status.as_u16(), "Request has no usable credentials");
            }
        }

        let body = ErrorResponse {
            success: false,
            error: ErrorDetail {
                message: self.public_message().to_string(),
                code: self.code().map(str::to_string),
            },
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_unauthenticated_response() {
        let response = GatewayError::Unauthenticated.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");
        assert_eq!(body["error"]["message"], "Not authenticated");
    }

    #[tokio::test]
    async fn test_configuration_response() {
        let response = GatewayError::Configuration.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["error"]["message"], "API base URL not configured");
    }

    #[tokio::test]
    async fn test_unavailable_hides_transport_detail() {
        let response =
            GatewayError::Unavailable("connection refused (os error 111)".to_string())
                .into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let body = body_json(response).await;
        assert_eq!(body["error"]["message"], "Failed to connect to Lemon API");
        assert!(body["error"].get("code").is_none());
    }
}
