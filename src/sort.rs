//! Price ordering applied to one page at a time.
//!
//! Pages are sorted individually on arrival and never merged into a global
//! order: once two pages are loaded, the second is not guaranteed to sort
//! after the first.

use std::cmp::Ordering;

use crate::{item::CatalogItem, types::SortOrder};

/// Compares two items under `order`. [`SortOrder::None`] treats all items as equal.
pub fn compare(order: SortOrder, a: &CatalogItem, b: &CatalogItem) -> Ordering {
    match order {
        SortOrder::None => Ordering::Equal,
        SortOrder::PriceAscending => a.price.total_cmp(&b.price),
        SortOrder::PriceDescending => b.price.total_cmp(&a.price),
    }
}

/// Stable in-place sort of a single received page.
pub fn sort_page(order: SortOrder, items: &mut [CatalogItem]) {
    if order == SortOrder::None {
        return;
    }
    items.sort_by(|a, b| compare(order, a, b));
}
