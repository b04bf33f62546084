//! Current user endpoint.

use axum::{extract::State, response::Response};
use axum_extra::extract::CookieJar;

use super::{api_path, forward};
use crate::state::AppState;
use crate::upstream::ProxyRequest;

/// GET /api/lemon/me
pub async fn me_handler(State(state): State<AppState>, jar: CookieJar) -> Response {
    forward(&state, jar, ProxyRequest::get(api_path("me"))).await
}
