//! Configuration types.
//!
//! File sections ([`UpstreamSection`], [`ServerSection`]) keep only the keys
//! a file actually set, so layers merge key by key. [`LemonConfig::upstream`]
//! and [`LemonConfig::server`] fill in defaults.

use std::net::SocketAddr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ConfigError, Result};

/// Built-in defaults applied when a section or field is absent.
pub mod defaults {
    pub const PORT: u16 = 3000;
    pub const BIND: &str = "127.0.0.1";
    pub const UPSTREAM_TIMEOUT_SECS: u64 = 30;
    pub const MAX_BODY_BYTES: usize = 1024 * 1024;
}

/// Root configuration, as read from `config.toml` / `lemon.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LemonConfig {
    /// Lemon API connection settings.
    pub upstream: Option<UpstreamSection>,

    /// HTTP listener settings.
    pub server: Option<ServerSection>,
}

impl LemonConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Merge another config on top of this one (other takes priority).
    ///
    /// Only keys present in `other` replace existing values.
    pub fn merge(&mut self, other: LemonConfig) {
        if let Some(upstream) = other.upstream {
            self.upstream
                .get_or_insert_with(UpstreamSection::default)
                .merge(upstream);
        }
        if let Some(server) = other.server {
            self.server
                .get_or_insert_with(ServerSection::default)
                .merge(server);
        }
    }

    /// The upstream section with defaults filled in.
    pub fn upstream(&self) -> UpstreamConfig {
        let section = self.upstream.clone().unwrap_or_default();
        UpstreamConfig {
            base_url: section.base_url,
            timeout_secs: section
                .timeout_secs
                .unwrap_or(defaults::UPSTREAM_TIMEOUT_SECS),
        }
    }

    /// The server section with defaults filled in.
    pub fn server(&self) -> ServerConfig {
        let section = self.server.clone().unwrap_or_default();
        let fallback = ServerConfig::default();
        ServerConfig {
            port: section.port.unwrap_or(fallback.port),
            bind: section.bind.unwrap_or(fallback.bind),
            environment: section.environment.unwrap_or(fallback.environment),
            request_logging: section.request_logging.unwrap_or(fallback.request_logging),
            cors_origins: section.cors_origins.unwrap_or(fallback.cors_origins),
            max_body_bytes: section.max_body_bytes.unwrap_or(fallback.max_body_bytes),
        }
    }
}

fn overlay<T>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// [upstream]
// ─────────────────────────────────────────────────────────────────────────────

/// `[upstream]` as written in a config file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpstreamSection {
    /// Base URL of the Lemon API, e.g. `https://lemon.example.com`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Per-call timeout in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl UpstreamSection {
    fn merge(&mut self, other: UpstreamSection) {
        overlay(&mut self.base_url, other.base_url);
        overlay(&mut self.timeout_secs, other.timeout_secs);
    }
}

/// Resolved connection settings for the Lemon API.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamConfig {
    pub base_url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: defaults::UPSTREAM_TIMEOUT_SECS,
        }
    }
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate and parse the base URL.
    ///
    /// An unset (or blank) base URL is not an error here: the gateway still
    /// starts and answers every proxied route with a configuration error.
    pub fn parsed_base_url(&self) -> Result<Option<Url>> {
        match self.base_url.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => parse_base_url(raw).map(Some),
        }
    }
}

/// Parse an upstream base URL, requiring an absolute http(s) URL.
pub fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidUrl {
        value: raw.to_string(),
        reason: e.to_string(),
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidUrl {
            value: raw.to_string(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }

    Ok(url)
}

// ─────────────────────────────────────────────────────────────────────────────
// [server]
// ─────────────────────────────────────────────────────────────────────────────

/// Deployment environment. Controls the `Secure` flag on auth cookies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    #[default]
    Production,
}

impl Environment {
    pub fn is_production(self) -> bool {
        matches!(self, Environment::Production)
    }
}

/// `[server]` as written in a config file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<Environment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_logging: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cors_origins: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_body_bytes: Option<usize>,
}

impl ServerSection {
    fn merge(&mut self, other: ServerSection) {
        overlay(&mut self.port, other.port);
        overlay(&mut self.bind, other.bind);
        overlay(&mut self.environment, other.environment);
        overlay(&mut self.request_logging, other.request_logging);
        overlay(&mut self.cors_origins, other.cors_origins);
        overlay(&mut self.max_body_bytes, other.max_body_bytes);
    }
}

/// Resolved HTTP listener settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// Port to listen on.
    pub port: u16,
    /// Address to bind to.
    pub bind: String,
    /// Cookie environment.
    pub environment: Environment,
    /// Enable request logging.
    pub request_logging: bool,
    /// CORS allowed origins (empty = no CORS layer).
    pub cors_origins: Vec<String>,
    /// Maximum accepted request body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: defaults::PORT,
            bind: defaults::BIND.to_string(),
            environment: Environment::default(),
            request_logging: true,
            cors_origins: Vec::new(),
            max_body_bytes: defaults::MAX_BODY_BYTES,
        }
    }
}

impl ServerConfig {
    /// Resolve `bind` and `port` into a socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.bind, self.port)
            .parse()
            .map_err(|_| ConfigError::InvalidBind(format!("{}:{}", self.bind, self.port)))
    }
}
