use crate::core::error::{QuoteError, Result};
use crate::core::{Quote, QuoteProvider};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error, instrument};

#[derive(Deserialize, Debug)]
struct UsdBrlResponse {
    #[serde(rename = "USDBRL")]
    usdbrl: Currency,
}

/// Mirrors the upstream payload; only `bid` is read.
#[allow(dead_code)]
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct Currency {
    #[serde(default)]
    code: String,
    #[serde(default)]
    codein: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    high: String,
    #[serde(default)]
    low: String,
    #[serde(default)]
    var_bid: String,
    #[serde(default)]
    pct_change: String,
    bid: String,
    #[serde(default)]
    ask: String,
    #[serde(default)]
    timestamp: String,
    #[serde(default, rename = "create_date")]
    create_date: String,
}

/// Fetches the USD-BRL bid from the AwesomeAPI `json/last` endpoint.
pub struct AwesomeApiProvider {
    url: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl AwesomeApiProvider {
    pub fn new(url: &str, timeout: Duration) -> Self {
        Self::with_client(url, timeout, reqwest::Client::new())
    }

    pub fn with_client(url: &str, timeout: Duration, client: reqwest::Client) -> Self {
        AwesomeApiProvider {
            url: url.to_string(),
            timeout,
            client,
        }
    }

    async fn request_body(&self) -> Result<String> {
        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(QuoteError::Status {
                status: status.as_u16(),
                url: self.url.clone(),
            });
        }

        Ok(response.text().await?)
    }
}

fn parse_bid(body: &str) -> Result<Quote> {
    let payload: UsdBrlResponse = serde_json::from_str(body)?;
    Ok(Quote::new(payload.usdbrl.bid))
}

#[async_trait]
impl QuoteProvider for AwesomeApiProvider {
    #[instrument(skip(self), fields(url = %self.url))]
    async fn fetch_quote(&self) -> Result<Quote> {
        debug!("Requesting quote from upstream");

        let body = match tokio::time::timeout(self.timeout, self.request_body()).await {
            Ok(Ok(body)) => body,
            Ok(Err(QuoteError::Network(e))) if e.is_timeout() => {
                error!(error = %e, "Upstream request timed out");
                return Err(QuoteError::timeout("upstream fetch", self.timeout));
            }
            Ok(Err(e)) => {
                error!(error = %e, "Upstream request failed");
                return Err(e);
            }
            Err(_) => {
                error!(timeout = ?self.timeout, "Upstream request timed out");
                return Err(QuoteError::timeout("upstream fetch", self.timeout));
            }
        };

        let quote = parse_bid(&body).inspect_err(|e| {
            error!(error = %e, response = %body, "Failed to parse upstream response");
        })?;
        debug!(bid = %quote.bid, "Fetched quote");
        Ok(quote)
    }
}
