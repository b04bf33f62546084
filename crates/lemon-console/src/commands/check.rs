//! Check command - prints the resolved configuration and probes the Lemon
//! API health endpoint.

use anyhow::{Result, bail};
use clap::Args;
use lemon_gateway::{Gateway, GatewayError};

use super::Context;
use crate::settings::{self, ConfigArgs};

/// Arguments for the check command.
#[derive(Args, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Output as JSON (for scripting)
    #[arg(long)]
    pub json: bool,
}

/// Run the check command.
pub async fn run(args: CheckArgs, ctx: &Context) -> Result<()> {
    let loaded = settings::load(&args.config)?;
    for warning in &loaded.warnings {
        eprintln!("warning: {}", warning);
    }

    let gateway_config = settings::gateway_config(&loaded.config)?;
    let server_config = settings::server_config(&loaded.config)?;
    let upstream = gateway_config
        .base_url
        .as_ref()
        .map(|u| u.to_string())
        .unwrap_or_else(|| "<unset>".to_string());

    let gateway = Gateway::new(&gateway_config);
    let probe = gateway.health().await;

    let (reachable, status) = match &probe {
        Ok(response) => (true, Some(response.status.as_u16())),
        Err(_) => (false, None),
    };

    if args.json {
        let report = serde_json::json!({
            "upstream": upstream,
            "timeoutSecs": gateway_config.timeout.as_secs(),
            "bind": server_config.bind_address.to_string(),
            "secureCookies": server_config.cookies.secure,
            "configFiles": loaded
                .loaded_from()
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>(),
            "reachable": reachable,
            "status": status,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Upstream:       {}", upstream);
        println!("Timeout:        {}s", gateway_config.timeout.as_secs());
        println!("Bind:           {}", server_config.bind_address);
        println!("Secure cookies: {}", server_config.cookies.secure);
        if ctx.verbose {
            for source in loaded.loaded_from() {
                println!("Loaded config:  {}", source.display());
            }
        }
        match &probe {
            Ok(response) => println!("Health:         HTTP {}", response.status.as_u16()),
            Err(e) => println!("Health:         {}", e),
        }
    }

    match probe {
        Err(GatewayError::Configuration) => bail!("upstream base URL is not configured"),
        Err(e) => bail!("upstream health check failed: {}", e),
        Ok(response) if !response.status.is_success() => {
            bail!("upstream reported HTTP {}", response.status.as_u16())
        }
        Ok(_) => Ok(()),
    }
}
