//! Configuration resolution: files, then CLI/env overrides, then the plain
//! values the gateway is built from.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context as _, Result};
use clap::Args;
use lemon_config::{LemonConfig, LoadedConfig, UpstreamSection};
use lemon_gateway::{CookiePolicy, GatewayConfig, ServerConfig};

/// Configuration flags shared by every command.
///
/// CLI arguments override config file values.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Path to config file (overrides default discovery)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory to look for `lemon.toml` in (default: current directory)
    #[arg(long)]
    pub project_dir: Option<PathBuf>,

    /// Lemon API base URL (overrides config)
    #[arg(long, env = "LEMON_API_BASE_URL")]
    pub upstream: Option<String>,

    /// Upstream call timeout in seconds (overrides config)
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

/// Load configuration files, either the explicit one or by discovery.
pub fn load(args: &ConfigArgs) -> Result<LoadedConfig> {
    let mut loaded = match args.config {
        Some(ref path) => {
            let config = lemon_config::load_config_file(path)?;
            LoadedConfig {
                config,
                sources: vec![lemon_config::discovery::ConfigSource {
                    path: path.clone(),
                    loaded: true,
                }],
                warnings: Vec::new(),
            }
        }
        None => lemon_config::load_config(args.project_dir.as_deref())?,
    };

    apply_upstream_overrides(&mut loaded.config, args);
    Ok(loaded)
}

fn apply_upstream_overrides(config: &mut LemonConfig, args: &ConfigArgs) {
    if args.upstream.is_none() && args.timeout_secs.is_none() {
        return;
    }

    let upstream = config
        .upstream
        .get_or_insert_with(UpstreamSection::default);
    if let Some(ref url) = args.upstream {
        upstream.base_url = Some(url.clone());
    }
    if let Some(secs) = args.timeout_secs {
        upstream.timeout_secs = Some(secs);
    }
}

/// Build the gateway's injected configuration from resolved settings.
pub fn gateway_config(config: &LemonConfig) -> Result<GatewayConfig> {
    let upstream = config.upstream();
    let base_url = upstream
        .parsed_base_url()
        .context("upstream base URL is invalid")?;

    if base_url.is_none() {
        tracing::warn!(
            "No upstream base URL configured; every proxied route will answer with a configuration error"
        );
    }

    Ok(GatewayConfig::new(base_url).with_timeout(Duration::from_secs(upstream.timeout_secs)))
}

/// Build the HTTP server configuration from resolved settings.
pub fn server_config(config: &LemonConfig) -> Result<ServerConfig> {
    let server = config.server();
    let cookies = if server.environment.is_production() {
        CookiePolicy::default()
    } else {
        CookiePolicy::development()
    };

    Ok(ServerConfig::default()
        .with_bind_address(server.socket_addr()?)
        .with_cookie_policy(cookies)
        .with_request_logging(server.request_logging)
        .with_cors_origins(server.cors_origins)
        .with_max_body_size(server.max_body_bytes))
}
