use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use crate::{
    item::{ItemDetail, Page, PageResponse},
    query::QueryDescriptor,
    types::{ItemId, Offset},
};

use super::{FetchResult, PageFetcher, TransportError};

/// Connection settings for [`HttpPageFetcher`].
#[derive(Debug, Clone)]
pub struct HttpFetcherConfig {
    /// Service root, e.g. `https://dummyjson.com`.
    pub base_url: String,
    /// Whole-request timeout.
    pub request_timeout_ms: u64,
    /// TCP connect timeout.
    pub connect_timeout_ms: u64,
}

impl Default for HttpFetcherConfig {
    fn default() -> Self {
        Self {
            base_url: "https://dummyjson.com".to_string(),
            request_timeout_ms: 10_000,
            connect_timeout_ms: 5_000,
        }
    }
}

/// Fetcher for the dummyjson-shaped catalog service.
#[derive(Debug, Clone)]
pub struct HttpPageFetcher {
    client: Client,
    base_url: Url,
}

impl HttpPageFetcher {
    /// Builds the client. Fails on an unusable base URL.
    pub fn new(config: &HttpFetcherConfig) -> FetchResult<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| TransportError::InvalidUrl(format!("{}: {e}", config.base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(TransportError::InvalidUrl(config.base_url.clone()));
        }

        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .build()?;

        Ok(Self { client, base_url })
    }

    /// Builds the request URL for one page.
    ///
    /// A search term wins over a category when both are set.
    pub fn page_url(&self, query: &QueryDescriptor, offset: Offset) -> FetchResult<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| TransportError::InvalidUrl(self.base_url.to_string()))?;
            segments.pop_if_empty().push("products");
            match (query.term(), query.category()) {
                (Some(_), _) => {
                    segments.push("search");
                }
                (None, Some(category)) => {
                    segments.push("category").push(category);
                }
                (None, None) => {}
            }
        }
        {
            let mut pairs = url.query_pairs_mut();
            if let Some(term) = query.term() {
                pairs.append_pair("q", term);
            }
            pairs
                .append_pair("limit", &query.page_size().to_string())
                .append_pair("skip", &offset.to_string());
        }
        Ok(url)
    }

    /// Builds the detail URL for one item.
    pub fn item_url(&self, id: ItemId) -> FetchResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| TransportError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .push("products")
            .push(&id.to_string());
        Ok(url)
    }

    /// Fetches the full detail record for one item.
    pub async fn fetch_item(&self, id: ItemId) -> FetchResult<ItemDetail> {
        let url = self.item_url(id)?;
        self.get_json(url).await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> FetchResult<T> {
        tracing::debug!(%url, "catalog request");
        let response = self.client.get(url.clone()).send().await.map_err(|err| {
            if err.is_timeout() {
                tracing::warn!(%url, "catalog request timed out");
            } else {
                tracing::warn!(%url, error = %err, "catalog request failed");
            }
            TransportError::Request(err)
        })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%url, status = status.as_u16(), "catalog request rejected");
            return Err(TransportError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch_page(&self, query: &QueryDescriptor, offset: Offset) -> FetchResult<Page> {
        let url = self.page_url(query, offset)?;
        let response: PageResponse = self.get_json(url).await?;
        Ok(response.into())
    }
}
