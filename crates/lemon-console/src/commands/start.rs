//! Start command - runs the gateway server.

use anyhow::Result;
use clap::Args;
use lemon_config::{Environment, LemonConfig, ServerSection};
use lemon_gateway::Server;

use super::Context;
use crate::settings::{self, ConfigArgs};

/// Arguments for the start command.
///
/// CLI arguments override config file values.
#[derive(Args, Debug)]
pub struct StartArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Port to listen on (overrides config)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Address to bind to (overrides config)
    #[arg(short, long)]
    pub bind: Option<String>,

    /// Local development mode: auth cookies without the Secure flag
    #[arg(long)]
    pub dev: bool,

    /// Allowed CORS origin (can be specified multiple times; overrides config)
    #[arg(long = "cors-origin")]
    pub cors_origins: Vec<String>,
}

impl StartArgs {
    fn apply(&self, config: &mut LemonConfig) {
        let server = config.server.get_or_insert_with(ServerSection::default);
        if let Some(port) = self.port {
            server.port = Some(port);
        }
        if let Some(ref bind) = self.bind {
            server.bind = Some(bind.clone());
        }
        if self.dev {
            server.environment = Some(Environment::Development);
        }
        if !self.cors_origins.is_empty() {
            server.cors_origins = Some(self.cors_origins.clone());
        }
    }
}

/// Run the start command.
pub async fn run(args: StartArgs, ctx: &Context) -> Result<()> {
    let mut loaded = settings::load(&args.config)?;

    for warning in &loaded.warnings {
        eprintln!("warning: {}", warning);
    }

    if ctx.verbose {
        let sources = loaded.loaded_from();
        if sources.is_empty() {
            println!("No config files found, using defaults + CLI args");
        } else {
            for source in sources {
                println!("Loaded config: {}", source.display());
            }
        }
    }

    args.apply(&mut loaded.config);

    let gateway = settings::gateway_config(&loaded.config)?;
    let server = settings::server_config(&loaded.config)?;

    tracing::info!(
        upstream = gateway.base_url.as_ref().map(|u| u.as_str()).unwrap_or("<unset>"),
        timeout_secs = gateway.timeout.as_secs(),
        secure_cookies = server.cookies.secure,
        "Gateway configured"
    );

    Server::new(gateway, server).run().await?;
    Ok(())
}
