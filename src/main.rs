mod config;
mod constants;
mod core_auth;
mod core_cli;
mod core_extension;
mod core_ftpcommand;
mod core_listener;
mod core_log;
mod core_network;
mod core_tls;
mod helpers;
mod server;
mod session;

use crate::config::Config;
use crate::constants::DEFAULT_CONFIG_PATH;
use crate::core_cli::Cli;
use anyhow::{Context, Result};
use clap::Parser;
use log::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Cli::parse();

    if let Some(plain) = args.hash_password.as_deref() {
        let hashed = core_auth::helper::hash_password(plain).context("Failed to hash password")?;
        println!("{}", hashed);
        return Ok(());
    }

    core_log::logger::init_logger(args.verbose);

    // Load configuration from the TOML file
    let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let mut config = Config::load_from_file(config_path)
        .with_context(|| format!("Failed to load configuration file: {}", config_path))?;

    // Override listen port from CLI if provided
    if let Some(port) = args.port {
        config.server.listen_port = port;
    }
    config.validate().context("Invalid configuration")?;
    info!("Configuration loaded from {}", config_path);

    // Run the FTP server
    server::run(config).await?;

    Ok(())
}
