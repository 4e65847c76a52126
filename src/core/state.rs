use hashbrown::HashMap;
use thiserror::Error;

use crate::{
    fetch::TransportError,
    item::{CatalogItem, Page},
    query::QueryDescriptor,
    sort::sort_page,
    types::{Generation, ItemId, Offset},
};

/// Why a completed fetch did not change the collection.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The fetch itself failed; the same offset can be retried.
    #[error("failed to load more: {0}")]
    Transport(#[from] TransportError),
    /// The query was replaced while the fetch was in flight.
    #[error("result for generation {issued} arrived at generation {current}")]
    StaleResult {
        /// Generation the fetch was issued under.
        issued: Generation,
        /// Generation current when it resolved.
        current: Generation,
    },
}

/// Coarse loader state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// No fetch outstanding, more items may exist.
    Idle,
    /// A page fetch is outstanding.
    Loading,
    /// Nothing more to load for the current query.
    Exhausted,
}

impl Phase {
    /// Derives the phase from the in-flight and exhausted flags.
    pub fn from_flags(loading: bool, exhausted: bool) -> Self {
        if loading {
            Self::Loading
        } else if exhausted {
            Self::Exhausted
        } else {
            Self::Idle
        }
    }
}

/// Captured at issue time; the only way to complete a fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    /// Reset generation the fetch belongs to.
    pub generation: Generation,
    /// Requested offset.
    pub offset: Offset,
    /// Query the page is requested for.
    pub query: QueryDescriptor,
}

/// Effect of a successfully applied page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Page appended; more may be available.
    Appended {
        /// Items in the page.
        received: usize,
        /// Offset of the following page.
        next_offset: Offset,
    },
    /// Page appended and nothing further is available.
    Exhausted {
        /// Items in the page.
        received: usize,
    },
}

/// Why a proximity signal issued no fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ignored {
    /// A fetch is already in flight.
    Loading,
    /// No more items for the current query.
    Exhausted,
}

/// Accumulated results for one query, plus the paging cursor.
#[derive(Debug, Clone)]
pub struct CollectionState {
    query: QueryDescriptor,
    generation: Generation,
    items: Vec<CatalogItem>,
    pos: HashMap<ItemId, usize>,
    next_offset: Offset,
    total: Option<u64>,
    in_flight: Option<FetchTicket>,
    exhausted: bool,
}

impl CollectionState {
    /// Seeds the state with a page fetched before the loader existed.
    ///
    /// With an unknown `total`, only an empty seed page counts as exhausted.
    pub fn seeded(query: QueryDescriptor, mut items: Vec<CatalogItem>, total: Option<u64>) -> Self {
        sort_page(query.sort(), &mut items);
        let mut state = Self {
            query,
            generation: 0,
            items: Vec::new(),
            pos: HashMap::new(),
            next_offset: items.len() as Offset,
            total,
            in_flight: None,
            exhausted: false,
        };
        state.exhausted = items.is_empty() || total.is_some_and(|t| items.len() as u64 >= t);
        state.append(items);
        state
    }

    /// Replaces the query, dropping everything loaded under the old one.
    ///
    /// Returns `None` when `query` equals the current one.
    pub fn replace_query(&mut self, query: QueryDescriptor) -> Option<FetchTicket> {
        if query == self.query {
            return None;
        }

        self.query = query;
        self.generation += 1;
        self.items.clear();
        self.pos.clear();
        self.next_offset = 0;
        self.total = None;
        self.exhausted = false;
        self.in_flight = None;
        Some(self.issue(0))
    }

    /// Handles a proximity signal: issues the next page unless one is
    /// already in flight or the query is exhausted.
    pub fn request_next(&mut self) -> Result<FetchTicket, Ignored> {
        if self.in_flight.is_some() {
            return Err(Ignored::Loading);
        }
        if self.exhausted {
            return Err(Ignored::Exhausted);
        }
        Ok(self.issue(self.next_offset))
    }

    /// Applies the result of the fetch identified by `ticket`.
    pub fn complete(
        &mut self,
        ticket: &FetchTicket,
        result: Result<Page, TransportError>,
    ) -> Result<LoadOutcome, LoadError> {
        if ticket.generation != self.generation || self.in_flight.as_ref() != Some(ticket) {
            return Err(LoadError::StaleResult {
                issued: ticket.generation,
                current: self.generation,
            });
        }
        self.in_flight = None;

        let page = result?;
        let received = page.items.len();
        if let Some(total) = page.total {
            self.total = Some(total);
        }

        let step = page
            .effective_page_size
            .filter(|n| *n > 0)
            .unwrap_or(ticket.query.page_size());
        self.next_offset = ticket.offset + Offset::from(step);

        let mut items = page.items;
        sort_page(self.query.sort(), &mut items);
        self.append(items);

        let reached_total = self.total.is_some_and(|t| self.items.len() as u64 >= t);
        if received == 0 || reached_total {
            self.exhausted = true;
            return Ok(LoadOutcome::Exhausted { received });
        }
        Ok(LoadOutcome::Appended {
            received,
            next_offset: self.next_offset,
        })
    }

    /// Active query.
    pub fn query(&self) -> &QueryDescriptor {
        &self.query
    }

    /// Number of resets so far.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Accumulated items in arrival order.
    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    /// First loaded item with `id`.
    pub fn get(&self, id: ItemId) -> Option<&CatalogItem> {
        self.pos.get(&id).and_then(|idx| self.items.get(*idx))
    }

    /// Offset the next page will be requested at.
    pub fn next_offset(&self) -> Offset {
        self.next_offset
    }

    /// Total available, once known.
    pub fn total(&self) -> Option<u64> {
        self.total
    }

    /// Ticket of the outstanding fetch.
    pub fn in_flight(&self) -> Option<&FetchTicket> {
        self.in_flight.as_ref()
    }

    /// True while a fetch is outstanding.
    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// True once nothing more can be loaded for the query.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        Phase::from_flags(self.in_flight.is_some(), self.exhausted)
    }

    fn issue(&mut self, offset: Offset) -> FetchTicket {
        let ticket = FetchTicket {
            generation: self.generation,
            offset,
            query: self.query.clone(),
        };
        self.in_flight = Some(ticket.clone());
        ticket
    }

    fn append(&mut self, items: Vec<CatalogItem>) {
        for item in items {
            self.pos.entry(item.id).or_insert(self.items.len());
            self.items.push(item);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: u64, price: f64) -> CatalogItem {
        CatalogItem {
            id,
            title: format!("item {id}"),
            thumbnail: String::new(),
            description: String::new(),
            price,
            category: "misc".to_string(),
        }
    }

    #[test]
    fn get_keeps_first_position_for_repeated_ids() {
        let mut state = CollectionState::seeded(
            QueryDescriptor::new(),
            vec![item(1, 1.0), item(2, 2.0)],
            Some(10),
        );
        let ticket = state.request_next().expect("issue");
        state
            .complete(
                &ticket,
                Ok(Page {
                    items: vec![item(2, 5.0), item(3, 3.0)],
                    total: None,
                    effective_page_size: None,
                }),
            )
            .expect("apply");

        assert_eq!(state.items().len(), 4);
        assert_eq!(state.get(2).map(|i| i.price), Some(2.0));
        assert_eq!(state.get(3).map(|i| i.price), Some(3.0));
        assert!(state.get(99).is_none());
    }

    #[test]
    fn zero_effective_page_size_falls_back_to_requested() {
        let mut state = CollectionState::seeded(QueryDescriptor::new(), vec![item(1, 1.0)], Some(100));
        let ticket = state.request_next().expect("issue");
        assert_eq!(ticket.offset, 1);
        state
            .complete(
                &ticket,
                Ok(Page {
                    items: vec![item(2, 1.0)],
                    total: Some(100),
                    effective_page_size: Some(0),
                }),
            )
            .expect("apply");
        assert_eq!(state.next_offset(), 21);
    }

    #[test]
    fn equal_query_is_not_a_reset() {
        let mut state = CollectionState::seeded(QueryDescriptor::new(), vec![item(1, 1.0)], Some(5));
        assert!(state.replace_query(QueryDescriptor::new()).is_none());
        assert_eq!(state.items().len(), 1);
        assert_eq!(state.generation(), 0);
    }

    #[test]
    fn server_reported_page_size_drives_offset() {
        let seed: Vec<CatalogItem> = (1..=20).map(|id| item(id, 1.0)).collect();
        let mut state = CollectionState::seeded(QueryDescriptor::new(), seed, Some(100));
        let ticket = state.request_next().expect("issue");
        assert_eq!(ticket.offset, 20);

        let outcome = state
            .complete(
                &ticket,
                Ok(Page {
                    items: (21..=30).map(|id| item(id, 1.0)).collect(),
                    total: Some(100),
                    effective_page_size: Some(10),
                }),
            )
            .expect("apply");

        assert_eq!(outcome, LoadOutcome::Appended { received: 10, next_offset: 30 });
        assert_eq!(state.next_offset(), ticket.offset + 10);
        assert_eq!(state.request_next().map(|t| t.offset), Ok(30));
    }

    #[test]
    fn unknown_total_seed_stays_idle_until_an_empty_page() {
        let seed: Vec<CatalogItem> = (1..=20).map(|id| item(id, 1.0)).collect();
        let mut state = CollectionState::seeded(QueryDescriptor::new(), seed, None);
        assert_eq!(state.phase(), Phase::Idle);
        assert_eq!(state.total(), None);

        let ticket = state.request_next().expect("issue");
        assert_eq!(ticket.offset, 20);
        let outcome = state
            .complete(
                &ticket,
                Ok(Page {
                    items: (21..=40).map(|id| item(id, 1.0)).collect(),
                    total: None,
                    effective_page_size: None,
                }),
            )
            .expect("apply");
        assert_eq!(outcome, LoadOutcome::Appended { received: 20, next_offset: 40 });

        let ticket = state.request_next().expect("issue");
        let outcome = state.complete(&ticket, Ok(Page::default())).expect("apply");
        assert_eq!(outcome, LoadOutcome::Exhausted { received: 0 });
        assert_eq!(state.phase(), Phase::Exhausted);
        assert_eq!(state.items().len(), 40);
    }

    #[test]
    fn phase_from_flags_prefers_loading() {
        assert_eq!(Phase::from_flags(true, true), Phase::Loading);
        assert_eq!(Phase::from_flags(false, true), Phase::Exhausted);
        assert_eq!(Phase::from_flags(false, false), Phase::Idle);
    }
}
