//! Runtime event stream payloads.

use std::sync::Arc;

use crate::{
    core::state::{CollectionState, Phase},
    item::CatalogItem,
    query::QueryDescriptor,
    types::Offset,
};

/// Read-only view of the collection handed to subscribers.
#[derive(Debug, Clone, PartialEq)]
pub struct LoaderSnapshot {
    /// Query the items belong to.
    pub query: QueryDescriptor,
    /// Accumulated items in arrival order.
    pub items: Arc<[CatalogItem]>,
    /// True while a page fetch is outstanding.
    pub loading: bool,
    /// True once no more items are available for `query`.
    pub exhausted: bool,
    /// Total reported by the server, if known yet.
    pub total: Option<u64>,
    /// Offset the next page will be requested at.
    pub next_offset: Offset,
}

impl LoaderSnapshot {
    /// Captures the current state.
    pub fn capture(state: &CollectionState) -> Self {
        Self {
            query: state.query().clone(),
            items: state.items().into(),
            loading: state.is_loading(),
            exhausted: state.is_exhausted(),
            total: state.total(),
            next_offset: state.next_offset(),
        }
    }

    /// Loader phase derived from the flags.
    pub fn phase(&self) -> Phase {
        Phase::from_flags(self.loading, self.exhausted)
    }
}

/// Events emitted from the single-writer loader loop.
#[derive(Debug, Clone, PartialEq)]
pub enum LoaderEvent {
    /// Items, loading, or exhaustion changed.
    StateChanged(LoaderSnapshot),
    /// A page fetch failed; already displayed items are untouched.
    LoadFailed {
        /// Offset that may be retried.
        offset: Offset,
        /// Human-readable failure.
        message: String,
    },
}
