pub mod bootstrap;
pub mod cli;
pub mod client;
pub mod core;
pub mod providers;
pub mod server;
pub mod store;

use crate::client::QuoteClient;
use crate::core::config::AppConfig;
use anyhow::{Context, Result};
use tracing::{debug, info};

pub enum AppCommand {
    /// Service in the background, readiness poll, one client run
    Run,
    /// Service only, until the process is stopped
    Serve,
    /// One client run against an already running service
    Fetch,
    History { limit: u32 },
}

pub fn load_config(config_path: Option<&str>) -> Result<AppConfig> {
    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");
    Ok(config)
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    let config = load_config(config_path)?;

    match command {
        AppCommand::Run => bootstrap::run(&config).await,
        AppCommand::Serve => {
            let service = bootstrap::start_service(&config).await?;
            info!("Serving quotes, press Ctrl+C to stop");
            service.await.context("Quote service task panicked")
        }
        AppCommand::Fetch => {
            QuoteClient::new(&config.client).run().await;
            Ok(())
        }
        AppCommand::History { limit } => cli::history::show_history(&config, limit).await,
    }
}
