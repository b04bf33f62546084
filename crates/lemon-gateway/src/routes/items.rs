//! Item CRUD endpoints.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    response::Response,
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use super::{api_path, forward, segment};
use crate::state::AppState;
use crate::upstream::ProxyRequest;

/// Query parameters accepted by the item list.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListItemsQuery {
    /// Include items of all owners (admin only, enforced upstream).
    pub include_all: Option<String>,
}

impl ListItemsQuery {
    fn upstream_path(&self) -> String {
        match self.include_all.as_deref().filter(|v| !v.is_empty()) {
            Some(value) => format!(
                "{}?includeAll={}",
                api_path("items"),
                urlencoding::encode(value)
            ),
            None => api_path("items"),
        }
    }
}

fn item_path(id: &str) -> String {
    api_path(&format!("items/{}", segment(id)))
}

/// GET /api/lemon/items
pub async fn list_items_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<ListItemsQuery>,
) -> Response {
    forward(&state, jar, ProxyRequest::get(query.upstream_path())).await
}

/// POST /api/lemon/items
pub async fn create_item_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Bytes,
) -> Response {
    forward(&state, jar, ProxyRequest::post(api_path("items")).with_body(body)).await
}

/// GET /api/lemon/items/{id}
pub async fn get_item_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(id): Path<String>,
) -> Response {
    forward(&state, jar, ProxyRequest::get(item_path(&id))).await
}

/// PATCH /api/lemon/items/{id}
pub async fn update_item_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(id): Path<String>,
    body: Bytes,
) -> Response {
    forward(&state, jar, ProxyRequest::patch(item_path(&id)).with_body(body)).await
}

/// DELETE /api/lemon/items/{id}
pub async fn delete_item_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(id): Path<String>,
) -> Response {
    forward(&state, jar, ProxyRequest::delete(item_path(&id))).await
}
