//! Incremental, paged loading of a remote product catalog.
//!
//! A [`core::state::CollectionState`] holds the items loaded so far for one
//! [`query::QueryDescriptor`]. The loader task spawned by
//! [`runtime::handle::spawn_loader`] owns that state, issues at most one page
//! fetch at a time, and discards pages that arrive after the query changed.
//!
//! # Examples
//!
//! Driving the state machine directly:
//! ```
//! use catalogfeed::{
//!     core::state::{CollectionState, LoadOutcome, Phase},
//!     item::{CatalogItem, Page},
//!     query::QueryDescriptor,
//! };
//!
//! let item = |id| CatalogItem {
//!     id,
//!     title: format!("item {id}"),
//!     thumbnail: String::new(),
//!     description: String::new(),
//!     price: 1.0,
//!     category: "misc".to_string(),
//! };
//!
//! let mut state = CollectionState::seeded(QueryDescriptor::new(), (1..=20).map(item).collect(), Some(30));
//! let ticket = state.request_next().expect("idle");
//! assert_eq!(state.phase(), Phase::Loading);
//!
//! let page = Page { items: (21..=30).map(item).collect(), total: Some(30), effective_page_size: None };
//! assert_eq!(state.complete(&ticket, Ok(page)).expect("apply"), LoadOutcome::Exhausted { received: 10 });
//! ```
//!
//! Running the loader against the live service:
//! ```no_run
//! use std::sync::Arc;
//!
//! use catalogfeed::{
//!     core::state::CollectionState,
//!     fetch::{PageFetcher, http::{HttpFetcherConfig, HttpPageFetcher}},
//!     query::QueryDescriptor,
//!     runtime::handle::{spawn_loader, LoaderConfig},
//! };
//!
//! # #[tokio::main]
//! # async fn main() {
//! let fetcher = Arc::new(HttpPageFetcher::new(&HttpFetcherConfig::default()).expect("client"));
//! let query = QueryDescriptor::new().with_category("smartphones");
//! let first = fetcher.fetch_page(&query, 0).await.expect("first page");
//! let state = CollectionState::seeded(query, first.items, first.total);
//!
//! let handle = spawn_loader(state, fetcher, LoaderConfig::default());
//! handle.near_end().await.expect("trigger");
//! handle.shutdown().await.expect("shutdown");
//! # }
//! ```
#![warn(missing_docs)]

/// Synchronous collection state machine.
pub mod core;
/// Page fetcher trait and HTTP implementation.
pub mod fetch;
/// Catalog item records and wire shapes.
pub mod item;
/// Query descriptor and validation.
pub mod query;
/// Single-writer loader runtime handle and events.
pub mod runtime;
/// Per-page sort policy.
pub mod sort;
/// Proximity trigger adapter.
pub mod trigger;
/// Shared primitive types and enums.
pub mod types;
