//! Startup sequencing: store, service, readiness poll, then one client run.

use crate::client::QuoteClient;
use crate::core::config::AppConfig;
use crate::providers::AwesomeApiProvider;
use crate::server::{self, AppState};
use crate::store::SqliteQuoteStore;
use anyhow::{Context, Result, bail};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Opens the store, binds the listener and spawns the service in the
/// background. Store and bind failures are returned before anything runs.
pub async fn start_service(config: &AppConfig) -> Result<JoinHandle<()>> {
    let store = SqliteQuoteStore::initialize(&config.store)
        .await
        .with_context(|| format!("Failed to open database: {}", config.store.path.display()))?;
    let provider = AwesomeApiProvider::new(&config.upstream.url, config.upstream.timeout());
    let state = AppState::new(Arc::new(provider), Arc::new(store));

    let listener = server::bind(&config.server.listen_addr).await?;

    info!("Starting server...");
    Ok(tokio::spawn(async move {
        if let Err(e) = server::serve(listener, state).await {
            error!(error = %e, "Quote service failed");
        }
    }))
}

/// Polls `url` with plain GETs until it answers `200 OK`.
///
/// With `max_attempts` unset this waits forever.
pub async fn wait_for_server(
    url: &str,
    interval: Duration,
    max_attempts: Option<u32>,
) -> Result<()> {
    let http = reqwest::Client::new();
    let mut attempt: u32 = 0;
    loop {
        attempt += 1;
        match http.get(url).send().await {
            Ok(response) if response.status() == reqwest::StatusCode::OK => {
                info!(attempt, "Server is up and running.");
                return Ok(());
            }
            Ok(response) => {
                info!(attempt, status = %response.status(), "Waiting for the server to be ready...")
            }
            Err(e) => info!(attempt, error = %e, "Waiting for the server to be ready..."),
        }

        if max_attempts.is_some_and(|max| attempt >= max) {
            bail!("Server at {url} not ready after {attempt} attempts");
        }
        tokio::time::sleep(interval).await;
    }
}

/// Full flow: service in the background, readiness poll, one client run.
pub async fn run(config: &AppConfig) -> Result<()> {
    let _service = start_service(config).await?;

    wait_for_server(
        &config.client.url,
        config.bootstrap.poll_interval(),
        config.bootstrap.max_attempts,
    )
    .await?;

    QuoteClient::new(&config.client).run().await;
    Ok(())
}
