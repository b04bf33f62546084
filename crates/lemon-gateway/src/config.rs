//! Gateway and server configuration.
//!
//! Both are plain values injected by the caller; nothing in this crate reads
//! the process environment.

use std::net::SocketAddr;
use std::time::Duration;

use url::Url;

use crate::credentials::CookiePolicy;

/// Default timeout for a single upstream call (30 seconds).
pub const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(30);

/// Default max body size for proxied requests (1 MB).
pub const DEFAULT_MAX_BODY_SIZE: usize = 1024 * 1024;

/// Upstream settings used by the proxy.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Lemon API base URL. `None` makes every proxied route fail with a
    /// configuration error before any network call.
    pub base_url: Option<Url>,

    /// Timeout applied to each upstream call, refresh included.
    pub timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: DEFAULT_UPSTREAM_TIMEOUT,
        }
    }
}

impl GatewayConfig {
    pub fn new(base_url: Option<Url>) -> Self {
        Self {
            base_url,
            ..Default::default()
        }
    }

    /// Set the upstream call timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the server to.
    pub bind_address: SocketAddr,

    /// Attributes for the auth cookies.
    pub cookies: CookiePolicy,

    /// Enable request logging.
    pub request_logging: bool,

    /// CORS allowed origins (empty = no CORS).
    pub cors_origins: Vec<String>,

    /// Maximum request body size in bytes.
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([127, 0, 0, 1], 3000)),
            cookies: CookiePolicy::default(),
            request_logging: true,
            cors_origins: Vec::new(),
            max_body_size: DEFAULT_MAX_BODY_SIZE,
        }
    }
}

impl ServerConfig {
    /// Set the bind address.
    pub fn with_bind_address(mut self, addr: SocketAddr) -> Self {
        self.bind_address = addr;
        self
    }

    /// Set the cookie policy.
    pub fn with_cookie_policy(mut self, cookies: CookiePolicy) -> Self {
        self.cookies = cookies;
        self
    }

    /// Enable or disable request logging.
    pub fn with_request_logging(mut self, enabled: bool) -> Self {
        self.request_logging = enabled;
        self
    }

    /// Set CORS allowed origins.
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = origins;
        self
    }

    /// Set the maximum request body size.
    pub fn with_max_body_size(mut self, size: usize) -> Self {
        self.max_body_size = size;
        self
    }
}
