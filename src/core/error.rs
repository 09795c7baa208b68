//! Error taxonomy shared by the fetcher, the store, the service and the client.

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuoteError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("{operation} timed out after {}ms", .after.as_millis())]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    #[error("unexpected HTTP status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl QuoteError {
    pub fn timeout(operation: &'static str, after: Duration) -> Self {
        QuoteError::Timeout { operation, after }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, QuoteError::Timeout { .. })
    }
}

pub type Result<T, E = QuoteError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_message_names_operation() {
        let err = QuoteError::timeout("upstream fetch", Duration::from_millis(200));
        assert!(err.is_timeout());
        assert_eq!(err.to_string(), "upstream fetch timed out after 200ms");
    }

    #[test]
    fn test_parse_error_is_not_timeout() {
        let err: QuoteError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, QuoteError::Parse(_)));
        assert!(!err.is_timeout());
    }
}
