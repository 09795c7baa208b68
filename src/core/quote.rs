//! Quote abstractions and core types

use crate::core::error::Result;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// The bid exposed by the service, e.g. `{"bid":"5.2543"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub bid: String,
}

impl Quote {
    pub fn new(bid: impl Into<String>) -> Self {
        Self { bid: bid.into() }
    }
}

impl Display for Quote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Dólar: {}", self.bid)
    }
}

/// A persisted bid observation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct QuoteRecord {
    pub id: i64,
    pub bid: String,
    pub timestamp: NaiveDateTime,
}

#[async_trait]
pub trait QuoteProvider: Send + Sync {
    async fn fetch_quote(&self) -> Result<Quote>;
}

/// Append-only log of observed bids.
#[async_trait]
pub trait QuoteStore: Send + Sync {
    async fn insert(&self, bid: &str) -> Result<()>;

    /// Newest records first.
    async fn recent(&self, limit: u32) -> Result<Vec<QuoteRecord>>;
}
