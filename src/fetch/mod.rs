//! Page sources for the loader.

/// reqwest-backed fetcher for the catalog service.
pub mod http;

use async_trait::async_trait;
use thiserror::Error;

use crate::{item::Page, query::QueryDescriptor, types::Offset};

/// A remote page request that did not complete successfully.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection, TLS, or body read failure.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// Non-success HTTP status.
    #[error("catalog service returned {status} for {url}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Requested URL.
        url: String,
    },
    /// Body was not the expected JSON shape.
    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),
    /// No response within the configured budget.
    #[error("request timed out after {after_ms}ms")]
    Timeout {
        /// Budget that elapsed.
        after_ms: u64,
    },
    /// Base URL could not be parsed or extended.
    #[error("invalid catalog url: {0}")]
    InvalidUrl(String),
}

/// Result alias for fetch operations.
pub type FetchResult<T> = Result<T, TransportError>;

/// Remote page source. Implementations hold no loader state.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches the page of `query` starting at `offset`.
    async fn fetch_page(&self, query: &QueryDescriptor, offset: Offset) -> FetchResult<Page>;
}
