//! Pagination types for list views.
//!
//! Lists are always served in fixed pages of [`PAGE_SIZE`] rows. Page numbers
//! are forgiving: anything unparseable means the first page and anything past
//! the end means the last page.

use serde::{Deserialize, Serialize};

/// Rows per page on every list view.
pub const PAGE_SIZE: u64 = 10;

/// Request parameters for paginated queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Page number (1-indexed).
    #[serde(default = "default_page")]
    pub page: u64,
    /// Number of items per page.
    #[serde(default = "default_per_page")]
    pub per_page: u64,
}

fn default_page() -> u64 {
    1
}

fn default_per_page() -> u64 {
    PAGE_SIZE
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: default_page(),
            per_page: default_per_page(),
        }
    }
}

impl PageRequest {
    /// Builds a request from a raw `?page=` query value.
    #[must_use]
    pub fn from_query(raw: Option<&str>) -> Self {
        let page = raw
            .and_then(|p| p.trim().parse::<u64>().ok())
            .filter(|p| *p > 0)
            .unwrap_or_else(default_page);
        Self {
            page,
            per_page: default_per_page(),
        }
    }

    /// Number of pages needed for `total` rows; never less than one.
    #[must_use]
    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(self.per_page.max(1)).max(1)
    }

    /// Returns the request with its page clamped into `1..=total_pages`.
    #[must_use]
    pub fn clamp(self, total: u64) -> Self {
        Self {
            page: self.page.clamp(1, self.total_pages(total)),
            ..self
        }
    }

    /// Calculates the offset for database queries.
    #[must_use]
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1) * self.per_page
    }

    /// Returns the limit for database queries.
    #[must_use]
    pub fn limit(&self) -> u64 {
        self.per_page
    }
}

/// Response wrapper for paginated data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse<T> {
    /// The items in the current page.
    pub data: Vec<T>,
    /// Pagination metadata.
    pub meta: PageMeta,
}

/// Pagination metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    /// Current page number.
    pub page: u64,
    /// Items per page.
    pub per_page: u64,
    /// Total number of items across all pages.
    pub total: u64,
    /// Total number of pages.
    pub total_pages: u64,
    /// Whether a later page exists.
    pub has_next: bool,
    /// Whether an earlier page exists.
    pub has_previous: bool,
}

impl<T> PageResponse<T> {
    /// Creates a new paginated response.
    #[must_use]
    pub fn new(data: Vec<T>, request: PageRequest, total: u64) -> Self {
        let total_pages = request.total_pages(total);

        Self {
            data,
            meta: PageMeta {
                page: request.page,
                per_page: request.per_page,
                total,
                total_pages,
                has_next: request.page < total_pages,
                has_previous: request.page > 1,
            },
        }
    }

    /// An empty first page.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(Vec::new(), PageRequest::default(), 0)
    }

    /// Converts every item, keeping the metadata.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PageResponse<U> {
        PageResponse {
            data: self.data.into_iter().map(f).collect(),
            meta: self.meta,
        }
    }
}

#[cfg(test)]
#[path = "pagination_tests.rs"]
mod tests;
