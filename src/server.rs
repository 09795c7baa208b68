//! HTTP service exposing `GET /cotacao`.
//!
//! Each request fetches a fresh quote from the configured provider, appends it
//! to the store and answers with `{"bid": "..."}`. Any failure along the way is
//! logged and answered with a bare `500`.

use crate::core::error::Result;
use crate::core::{Quote, QuoteProvider, QuoteStore};
use anyhow::Context;
use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

pub const QUOTE_PATH: &str = "/cotacao";

/// Dependencies shared by every request.
#[derive(Clone)]
pub struct AppState {
    provider: Arc<dyn QuoteProvider>,
    store: Arc<dyn QuoteStore>,
}

impl AppState {
    pub fn new(provider: Arc<dyn QuoteProvider>, store: Arc<dyn QuoteStore>) -> Self {
        Self { provider, store }
    }

    /// Fetches the current quote and persists it. Nothing is stored if the
    /// fetch fails.
    pub async fn fetch_and_persist(&self) -> Result<Quote> {
        let quote = self.provider.fetch_quote().await?;
        self.store.insert(&quote.bid).await?;
        Ok(quote)
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(QUOTE_PATH, get(get_quote))
        .with_state(state)
}

async fn get_quote(State(state): State<AppState>) -> std::result::Result<Json<Quote>, StatusCode> {
    match state.fetch_and_persist().await {
        Ok(quote) => {
            info!(bid = %quote.bid, "Served quote");
            Ok(Json(quote))
        }
        Err(e) => {
            error!(error = %e, "Failed to serve quote");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Binds the service listener. Callers treat failure as fatal.
pub async fn bind(addr: &str) -> anyhow::Result<TcpListener> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind quote service on {addr}"))?;
    info!(addr = %listener.local_addr()?, "Quote service listening");
    Ok(listener)
}

pub async fn serve(listener: TcpListener, state: AppState) -> anyhow::Result<()> {
    axum::serve(listener, router(state))
        .await
        .context("Quote service stopped unexpectedly")
}
