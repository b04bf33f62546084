//! Login and logout endpoints.

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use serde::Serialize;

use crate::credentials::StoredCredentials;
use crate::error::GatewayError;
use crate::session::LoginOutcome;
use crate::state::AppState;

/// Body returned on a successful login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<serde_json::Value>,
}

/// Body returned by logout.
#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub success: bool,
}

/// POST /api/lemon/auth/login
///
/// Tokens from upstream go straight into cookies and never reach the browser
/// body.
pub async fn login_handler(State(state): State<AppState>, jar: CookieJar, body: Bytes) -> Response {
    match state.gateway.login(body).await {
        Ok(LoginOutcome::Rejected(response)) => response.into_response(),
        Ok(LoginOutcome::Accepted { user, tokens }) => {
            let jar = match tokens {
                Some(tokens) => state.cookies().store(jar, &tokens),
                None => jar,
            };
            tracing::info!("Login succeeded");
            let body = LoginResponse {
                success: true,
                user,
            };
            (StatusCode::OK, jar, Json(body)).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// POST /api/lemon/auth/logout
///
/// Both cookies are cleared on every path, including a missing base URL.
pub async fn logout_handler(State(state): State<AppState>, jar: CookieJar) -> Response {
    let credentials = StoredCredentials::from_jar(&jar);
    let result = state.gateway.logout(credentials.refresh_token()).await;
    let jar = state.cookies().clear(jar);

    match result {
        Ok(()) => (StatusCode::OK, jar, Json(LogoutResponse { success: true })).into_response(),
        Err(e @ GatewayError::Configuration) => (jar, e).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "Logout error ignored");
            (StatusCode::OK, jar, Json(LogoutResponse { success: true })).into_response()
        }
    }
}
