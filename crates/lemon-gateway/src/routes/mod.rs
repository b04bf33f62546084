//! Browser-facing route handlers.
//!
//! Each `/api/lemon/...` route maps one-to-one onto an `/api/v1/...`
//! upstream endpoint.

pub mod admin;
pub mod auth;
pub mod health;
pub mod items;
pub mod me;

pub use admin::update_user_role_handler;
pub use auth::{login_handler, logout_handler};
pub use health::{health, health_routes, upstream_health_handler};
pub use items::{
    create_item_handler, delete_item_handler, get_item_handler, list_items_handler,
    update_item_handler,
};
pub use me::me_handler;

use axum::response::{IntoResponse, Response};
use axum_extra::extract::CookieJar;

use crate::credentials::StoredCredentials;
use crate::proxy::Forwarded;
use crate::state::AppState;
use crate::upstream::{API_PREFIX, ProxyRequest};

/// Upstream path for a versioned API resource.
pub(crate) fn api_path(resource: &str) -> String {
    format!("{}/{}", API_PREFIX, resource.trim_start_matches('/'))
}

/// Encode a single path segment taken from the browser.
pub(crate) fn segment(raw: &str) -> String {
    urlencoding::encode(raw).into_owned()
}

/// Forward with the request's cookies and apply any token rotation to the
/// outgoing jar.
pub(crate) async fn forward(state: &AppState, jar: CookieJar, request: ProxyRequest) -> Response {
    let credentials = StoredCredentials::from_jar(&jar);

    match state.gateway.forward(&credentials, &request).await {
        Ok(Forwarded { response, rotated }) => {
            let jar = match rotated {
                Some(tokens) => {
                    tracing::debug!(path = %request.path, "Rotating auth cookies");
                    state.cookies().store(jar, &tokens)
                }
                None => jar,
            };
            (jar, response).into_response()
        }
        Err(e) => e.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_path() {
        assert_eq!(api_path("items"), "/api/v1/items");
        assert_eq!(api_path("/me"), "/api/v1/me");
    }

    #[test]
    fn test_segment_is_encoded() {
        assert_eq!(segment("abc-123"), "abc-123");
        assert_eq!(segment("../admin"), "..%2Fadmin");
        assert_eq!(segment("a b?c"), "a%20b%3Fc");
    }
}
