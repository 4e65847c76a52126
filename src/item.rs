//! Catalog item records and the remote response shapes they arrive in.

use serde::{Deserialize, Serialize};

use crate::types::{ItemId, Offset};

/// One catalog entry as shown in a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    /// Identifier within the current catalog snapshot.
    pub id: ItemId,
    /// Display title.
    pub title: String,
    /// Thumbnail image reference.
    #[serde(default)]
    pub thumbnail: String,
    /// Short description.
    #[serde(default)]
    pub description: String,
    /// Non-negative unit price.
    pub price: f64,
    /// Category tag.
    #[serde(default)]
    pub category: String,
}

/// Full record served by the detail endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDetail {
    /// Listing fields.
    #[serde(flatten)]
    pub item: CatalogItem,
    /// Units in stock.
    #[serde(default)]
    pub stock: u64,
    /// Gallery image references.
    #[serde(default)]
    pub images: Vec<String>,
}

/// One page as decoded from the listing, search and category endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResponse {
    /// Items in server order.
    #[serde(default)]
    pub products: Vec<CatalogItem>,
    /// Total items available for the query.
    pub total: Option<u64>,
    /// Offset the server applied.
    pub skip: Option<Offset>,
    /// Page size the server applied.
    pub limit: Option<u32>,
}

/// One page handed from a fetcher to the loader.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Page {
    /// Received items in server order.
    pub items: Vec<CatalogItem>,
    /// Total available, when the server reports it.
    pub total: Option<u64>,
    /// Page size the server actually applied, when reported.
    pub effective_page_size: Option<u32>,
}

impl From<PageResponse> for Page {
    fn from(value: PageResponse) -> Self {
        Self {
            items: value.products,
            total: value.total,
            effective_page_size: value.limit,
        }
    }
}
