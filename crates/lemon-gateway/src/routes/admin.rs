//! Administrative endpoints.

use axum::{
    body::Bytes,
    extract::{Path, State},
    response::Response,
};
use axum_extra::extract::CookieJar;

use super::{api_path, forward, segment};
use crate::state::AppState;
use crate::upstream::ProxyRequest;

/// PATCH /api/lemon/admin/users/{id}/role
///
/// Role changes are authorized upstream; the gateway only relays.
pub async fn update_user_role_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(id): Path<String>,
    body: Bytes,
) -> Response {
    let path = api_path(&format!("admin/users/{}/role", segment(&id)));
    forward(&state, jar, ProxyRequest::patch(path).with_body(body)).await
}
