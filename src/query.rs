//! Immutable description of the catalog subset being browsed.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{DEFAULT_PAGE_SIZE, SortOrder};

/// Raw descriptor construction failures.
///
/// Callers reject these before building a loader; the loader only ever
/// sees validated descriptors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidConfiguration {
    /// Page size parsed but was zero or negative.
    #[error("page size must be positive, got {0}")]
    NonPositivePageSize(i64),
    /// Page size was not an integer.
    #[error("page size is not a number: {0:?}")]
    NonNumericPageSize(String),
    /// Sort token outside `asc`, `desc`, `none`.
    #[error("unknown sort token: {0:?}")]
    UnknownSortToken(String),
}

/// Unvalidated parameters, shaped like a URL query string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawQuery {
    /// Free-text search term.
    pub term: Option<String>,
    /// Category identifier.
    pub category: Option<String>,
    /// Sort token.
    pub sort: Option<String>,
    /// Page size as text.
    pub page_size: Option<String>,
}

/// Validated, immutable query. Every change produces a new value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueryDescriptor {
    term: Option<String>,
    category: Option<String>,
    sort: SortOrder,
    page_size: u32,
}

impl Default for QueryDescriptor {
    fn default() -> Self {
        Self {
            term: None,
            category: None,
            sort: SortOrder::None,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl QueryDescriptor {
    /// Unfiltered listing with default page size.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates raw parameters, applying defaults for absent values.
    pub fn from_raw(raw: &RawQuery) -> Result<Self, InvalidConfiguration> {
        let sort = match raw.sort.as_deref().map(str::trim) {
            None | Some("") => SortOrder::None,
            Some(token) => parse_sort(token)?,
        };
        let page_size = match raw.page_size.as_deref().map(str::trim) {
            None | Some("") => DEFAULT_PAGE_SIZE,
            Some(text) => parse_page_size(text)?,
        };

        Ok(Self {
            term: non_blank(raw.term.as_deref()),
            category: non_blank(raw.category.as_deref()),
            sort,
            page_size,
        })
    }

    /// Free-text search term.
    pub fn term(&self) -> Option<&str> {
        self.term.as_deref()
    }

    /// Category filter.
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// Client-side sort applied per page.
    pub fn sort(&self) -> SortOrder {
        self.sort
    }

    /// Requested items per page, always positive.
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Copy with a different search term.
    pub fn with_term(&self, term: impl Into<String>) -> Self {
        let term = term.into();
        Self {
            term: non_blank(Some(&term)),
            ..self.clone()
        }
    }

    /// Copy with a different category filter.
    pub fn with_category(&self, category: impl Into<String>) -> Self {
        let category = category.into();
        Self {
            category: non_blank(Some(&category)),
            ..self.clone()
        }
    }

    /// Copy with a different sort order.
    pub fn with_sort(&self, sort: SortOrder) -> Self {
        Self {
            sort,
            ..self.clone()
        }
    }

    /// Copy with a different page size.
    pub fn with_page_size(&self, page_size: u32) -> Result<Self, InvalidConfiguration> {
        if page_size == 0 {
            return Err(InvalidConfiguration::NonPositivePageSize(0));
        }
        Ok(Self {
            page_size,
            ..self.clone()
        })
    }
}

/// Parses `asc`, `desc`, or `none` (case-insensitive).
pub fn parse_sort(token: &str) -> Result<SortOrder, InvalidConfiguration> {
    match token.to_ascii_lowercase().as_str() {
        "none" => Ok(SortOrder::None),
        "asc" => Ok(SortOrder::PriceAscending),
        "desc" => Ok(SortOrder::PriceDescending),
        _ => Err(InvalidConfiguration::UnknownSortToken(token.to_string())),
    }
}

fn parse_page_size(text: &str) -> Result<u32, InvalidConfiguration> {
    let value: i64 = text
        .parse()
        .map_err(|_| InvalidConfiguration::NonNumericPageSize(text.to_string()))?;
    if value <= 0 {
        return Err(InvalidConfiguration::NonPositivePageSize(value));
    }
    u32::try_from(value).map_err(|_| InvalidConfiguration::NonNumericPageSize(text.to_string()))
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
