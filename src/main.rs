use std::path::Path;

use clap::Parser;

use static_host::cli::{Cli, Command};
use static_host::config::{load_config, ConfigOverrides};
use static_host::observability::logging;
use static_host::{lifecycle, RouteConfiguration};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Some(Command::Check { path }) => check(&path),
        Some(Command::Serve) | None => {
            let overrides = ConfigOverrides::from(cli.overrides);
            let config = load_config(cli.config.as_deref(), &overrides)?;
            logging::init(&config.observability);

            tracing::info!(
                version = env!("CARGO_PKG_VERSION"),
                bind_address = %config.listener.bind_address,
                control_address = %config.listener.control_address,
                domain_suffix = %config.sites.domain_suffix,
                "static-host starting"
            );

            lifecycle::run(config).await?;
            Ok(())
        }
    }
}

/// Parse a routing document and print its normalized form.
fn check(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let raw = std::fs::read(path)?;
    let config = RouteConfiguration::from_slice(&raw)?;
    println!("{}", serde_json::to_string_pretty(&config.to_document())?);
    Ok(())
}
