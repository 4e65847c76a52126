//! Shared primitive IDs and catalog-related enums.

use serde::{Deserialize, Serialize};

/// Catalog item identifier, unique within one catalog snapshot.
pub type ItemId = u64;
/// Count of items already requested under one query.
pub type Offset = u64;
/// Monotonic counter bumped on every query reset.
pub type Generation = u64;

/// Page size used when none is supplied.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Client-side ordering applied to each received page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortOrder {
    /// Keep the order the server returned.
    #[default]
    None,
    /// Price non-decreasing.
    PriceAscending,
    /// Price non-increasing.
    PriceDescending,
}

impl SortOrder {
    /// Wire token used in query strings.
    pub fn token(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::PriceAscending => "asc",
            Self::PriceDescending => "desc",
        }
    }
}
