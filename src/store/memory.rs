use crate::core::error::Result;
use crate::core::{QuoteRecord, QuoteStore};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// In-memory quote log, handy for running the service without a database file.
#[derive(Clone, Default)]
pub struct MemoryQuoteStore {
    inner: Arc<Mutex<Vec<QuoteRecord>>>,
}

impl MemoryQuoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl QuoteStore for MemoryQuoteStore {
    async fn insert(&self, bid: &str) -> Result<()> {
        let mut records = self.inner.lock().await;
        let record = QuoteRecord {
            id: records.len() as i64 + 1,
            bid: bid.to_string(),
            timestamp: Utc::now().naive_utc(),
        };
        debug!(id = record.id, bid, "Memory store INSERT");
        records.push(record);
        Ok(())
    }

    async fn recent(&self, limit: u32) -> Result<Vec<QuoteRecord>> {
        let records = self.inner.lock().await;
        Ok(records.iter().rev().take(limit as usize).cloned().collect())
    }
}
