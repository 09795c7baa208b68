use crate::core::config::ClientConfig;
use crate::core::error::{QuoteError, Result};
use crate::core::Quote;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, error, info};

/// One-shot consumer of the quote service.
pub struct QuoteClient {
    url: String,
    timeout: Duration,
    output_path: PathBuf,
    http: reqwest::Client,
}

impl QuoteClient {
    pub fn new(config: &ClientConfig) -> Self {
        QuoteClient {
            url: config.url.clone(),
            timeout: config.timeout(),
            output_path: config.output_path.clone(),
            http: reqwest::Client::new(),
        }
    }

    /// Fetches the quote and writes it to the output file. Failures are logged
    /// and leave the file as it was.
    pub async fn run(&self) {
        match self.try_run().await {
            Ok(quote) => info!(bid = %quote.bid, "Bid value: {}", quote.bid),
            Err(e) => error!(error = %e, url = %self.url, "Quote client failed"),
        }
    }

    pub async fn try_run(&self) -> Result<Quote> {
        let quote = match tokio::time::timeout(self.timeout, self.request_quote()).await {
            Ok(result) => result?,
            Err(_) => return Err(QuoteError::timeout("quote service call", self.timeout)),
        };

        tokio::fs::write(&self.output_path, quote.to_string()).await?;
        debug!(path = %self.output_path.display(), "Wrote quote file");
        Ok(quote)
    }

    async fn request_quote(&self) -> Result<Quote> {
        let response = self.http.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(QuoteError::Status {
                status: status.as_u16(),
                url: self.url.clone(),
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}
