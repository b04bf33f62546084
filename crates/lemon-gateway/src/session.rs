//! Login and logout against the Lemon API.
//!
//! These are the only places tokens are created or revoked. Neither goes
//! through the refresh-and-retry flow.

use axum::body::Bytes;
use serde::{Deserialize, Serialize};

use crate::credentials::TokenPair;
use crate::error::{GatewayError, Result};
use crate::proxy::Gateway;
use crate::upstream::{LOGIN_PATH, LOGOUT_PATH, ProxyRequest, UpstreamResponse};

/// Result of a login attempt that reached upstream.
#[derive(Debug)]
pub enum LoginOutcome {
    /// Upstream refused the login; relay its response verbatim.
    Rejected(UpstreamResponse),
    /// Upstream accepted the login.
    Accepted {
        /// Omitted from the browser response when upstream sent none.
        user: Option<serde_json::Value>,
        /// Present only when upstream returned both tokens.
        tokens: Option<TokenPair>,
    },
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    user: Option<serde_json::Value>,
    access_token: Option<String>,
    refresh_token: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LogoutRequest<'a> {
    refresh_token: &'a str,
}

impl Gateway {
    /// Forward login credentials upstream.
    ///
    /// The body is relayed untouched. A success response must be JSON; an
    /// unreadable one is treated like an unreachable upstream.
    pub async fn login(&self, body: Bytes) -> Result<LoginOutcome> {
        let request = ProxyRequest::post(LOGIN_PATH).with_body(body);
        let response = self.upstream().send_anonymous(&request).await?;

        if !response.status.is_success() {
            tracing::info!(status = %response.status.as_u16(), "Login rejected by upstream");
            return Ok(LoginOutcome::Rejected(response));
        }

        let parsed: LoginResponse = response.json().map_err(|e| {
            GatewayError::Unavailable(format!("invalid login response: {}", e))
        })?;

        let tokens = match (parsed.access_token, parsed.refresh_token) {
            (Some(access), Some(refresh)) if !access.is_empty() && !refresh.is_empty() => {
                Some(TokenPair::new(access, refresh))
            }
            _ => {
                tracing::warn!("Login succeeded without a full token pair");
                None
            }
        };

        Ok(LoginOutcome::Accepted {
            user: parsed.user,
            tokens,
        })
    }

    /// Revoke the refresh token upstream, best effort.
    ///
    /// Only a missing base URL is reported; upstream failures of any kind are
    /// logged and swallowed so local logout always proceeds.
    pub async fn logout(&self, refresh_token: Option<&str>) -> Result<()> {
        self.upstream().base_url()?;

        let Some(refresh_token) = refresh_token.filter(|t| !t.is_empty()) else {
            tracing::debug!("No refresh token held, skipping upstream logout");
            return Ok(());
        };

        let body = match serde_json::to_vec(&LogoutRequest { refresh_token }) {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to encode logout request");
                return Ok(());
            }
        };

        let request = ProxyRequest::post(LOGOUT_PATH).with_body(body);
        match self.upstream().send_anonymous(&request).await {
            Ok(response) if response.status.is_success() => {
                tracing::debug!("Refresh token revoked upstream");
            }
            Ok(response) => {
                tracing::warn!(status = %response.status.as_u16(), "Upstream logout failed");
            }
            Err(e) => {
                tracing::warn!(error = %e, "Upstream logout failed");
            }
        }

        Ok(())
    }
}
