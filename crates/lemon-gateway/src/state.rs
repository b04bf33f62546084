//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::{GatewayConfig, ServerConfig};
use crate::credentials::CookiePolicy;
use crate::proxy::Gateway;

/// Application state shared across all handlers.
///
/// Read-only after construction; requests share nothing else.
#[derive(Clone)]
pub struct AppState {
    /// The proxy gateway.
    pub gateway: Arc<Gateway>,

    /// Server configuration.
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// Create a new application state.
    pub fn new(gateway: GatewayConfig, config: ServerConfig) -> Self {
        Self {
            gateway: Arc::new(Gateway::new(&gateway)),
            config: Arc::new(config),
        }
    }

    pub fn cookies(&self) -> CookiePolicy {
        self.config.cookies
    }
}
