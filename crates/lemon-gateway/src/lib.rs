//! Authenticated proxy gateway for the Lemon console.
//!
//! Sits between the browser and the Lemon API: attaches the bearer token
//! held in an HTTP-only cookie, refreshes it transparently when missing or
//! rejected, retries once, and rotates the cookies when a refresh happened.
//!
//! # Components
//!
//! - [`proxy`]: `forward` state machine (refresh, single retry, rotation)
//! - [`upstream`]: `reqwest` client for the Lemon API, including refresh
//! - [`credentials`]: token pair and cookie storage
//! - [`session`]: login and best-effort logout
//! - [`routes`]: `/api/lemon/*` axum handlers
//!
//! # Example
//!
//! ```ignore
//! use lemon_gateway::{GatewayConfig, Server, ServerConfig};
//!
//! let gateway = GatewayConfig::new(Some("https://lemon.example.com".parse()?));
//! let server = Server::new(gateway, ServerConfig::default());
//! server.run().await?;
//! ```

pub mod config;
pub mod credentials;
pub mod error;
pub mod middleware;
pub mod proxy;
pub mod routes;
pub mod session;
pub mod state;
pub mod upstream;

pub use config::{GatewayConfig, ServerConfig};
pub use credentials::{CookiePolicy, StoredCredentials, TokenPair};
pub use error::{GatewayError, Result};
pub use proxy::{Forwarded, Gateway};
pub use session::LoginOutcome;
pub use state::AppState;
pub use upstream::{ProxyRequest, UpstreamClient, UpstreamResponse};

use std::net::SocketAddr;

use axum::http::{HeaderValue, Method, header};
use axum::{Router, middleware as axum_middleware};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Errors from running the HTTP listener.
#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// The gateway HTTP server.
pub struct Server {
    state: AppState,
}

impl Server {
    /// Create a new server from gateway and server configuration.
    pub fn new(gateway: GatewayConfig, config: ServerConfig) -> Self {
        Self {
            state: AppState::new(gateway, config),
        }
    }

    /// Create a server from a pre-built application state.
    pub fn from_state(state: AppState) -> Self {
        Self { state }
    }

    /// Build the router with all routes and middleware.
    pub fn router(&self) -> Router {
        let mut router = Router::new()
            .merge(routes::health_routes())
            .nest("/api/lemon", self.api_routes())
            .layer(axum_middleware::from_fn_with_state(
                self.state.clone(),
                middleware::request_logging_middleware,
            ))
            .layer(RequestBodyLimitLayer::new(self.state.config.max_body_size))
            .layer(TraceLayer::new_for_http());

        if let Some(cors) = self.cors_layer() {
            router = router.layer(cors);
        }

        router.with_state(self.state.clone())
    }

    /// Proxied API routes.
    fn api_routes(&self) -> Router<AppState> {
        use axum::routing::{get, patch, post};

        Router::new()
            .route("/auth/login", post(routes::login_handler))
            .route("/auth/logout", post(routes::logout_handler))
            .route("/me", get(routes::me_handler))
            .route(
                "/items",
                get(routes::list_items_handler).post(routes::create_item_handler),
            )
            .route(
                "/items/{id}",
                get(routes::get_item_handler)
                    .patch(routes::update_item_handler)
                    .delete(routes::delete_item_handler),
            )
            .route(
                "/admin/users/{id}/role",
                patch(routes::update_user_role_handler),
            )
    }

    /// CORS for a console served from another origin. Credentials are
    /// allowed so cookies flow; origins must therefore be explicit.
    fn cors_layer(&self) -> Option<CorsLayer> {
        let origins: Vec<HeaderValue> = self
            .state
            .config
            .cors_origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();

        if origins.is_empty() {
            return None;
        }

        Some(
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
                .allow_headers([header::CONTENT_TYPE])
                .allow_credentials(true),
        )
    }

    /// Run the server on the configured address.
    pub async fn run(self) -> std::result::Result<(), ServeError> {
        let addr = self.state.config.bind_address;
        self.run_on(addr).await
    }

    /// Run the server on a specific address (useful for testing).
    pub async fn run_on(self, addr: SocketAddr) -> std::result::Result<(), ServeError> {
        let router = self.router();

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServeError::Bind { addr, source })?;
        info!(addr = %listener.local_addr()?, "Starting gateway");

        axum::serve(listener, router).await?;
        Ok(())
    }

    /// Get the configured bind address.
    pub fn bind_address(&self) -> SocketAddr {
        self.state.config.bind_address
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_server_health_endpoint() {
        let server = Server::new(GatewayConfig::default(), ServerConfig::default());

        let response = server
            .router()
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_cors_preflight_for_allowed_origin() {
        let config = ServerConfig::default()
            .with_cors_origins(vec!["http://localhost:5173".to_string()]);
        let server = Server::new(GatewayConfig::default(), config);

        let response = server
            .router()
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri("/api/lemon/items")
                    .header("origin", "http://localhost:5173")
                    .header("access-control-request-method", "POST")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response
                .headers()
                .get("access-control-allow-origin")
                .unwrap(),
            "http://localhost:5173"
        );
        assert_eq!(
            response
                .headers()
                .get("access-control-allow-credentials")
                .unwrap(),
            "true"
        );
    }

    #[test]
    fn test_server_config_builder() {
        let config = ServerConfig::default()
            .with_bind_address("0.0.0.0:9000".parse().unwrap())
            .with_cookie_policy(CookiePolicy::development())
            .with_request_logging(false);

        assert_eq!(config.bind_address.port(), 9000);
        assert!(!config.cookies.secure);
        assert!(!config.request_logging);
    }
}
