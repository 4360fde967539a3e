//! Pagination types
//!
//! `PageRequest` is a validated `(page, page_size)` pair and `PagedResult`
//! carries one page of rows together with the total row count of the
//! unpaginated query.

use serde::{Deserialize, Serialize};

/// Rejected page/page size pair
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct PageRequestError(pub String);

/// Validated pagination parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    page: i64,
    page_size: i64,
}

impl PageRequest {
    /// Validate and build a page request.
    ///
    /// `page` is 1-based. `page < 1` or `page_size <= 0` is rejected.
    pub fn new(page: i64, page_size: i64) -> Result<Self, PageRequestError> {
        if page < 1 {
            return Err(PageRequestError(format!("page must be >= 1, got {}", page)));
        }
        if page_size <= 0 {
            return Err(PageRequestError(format!(
                "page_size must be > 0, got {}",
                page_size
            )));
        }
        Ok(Self { page, page_size })
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn page_size(&self) -> i64 {
        self.page_size
    }

    /// Row offset for the store query
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }

    /// Row limit for the store query
    pub fn limit(&self) -> i64 {
        self.page_size
    }
}

/// One page of results
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PagedResult<T> {
    /// Current page number (1-based)
    pub current_page: i64,
    /// Requested page size
    pub page_size: i64,
    /// Total rows matching the query before pagination
    pub row_count: i64,
    /// Rows of this page
    pub results: Vec<T>,
}

impl<T> PagedResult<T> {
    /// Assemble a page
    pub fn new(results: Vec<T>, row_count: i64, request: &PageRequest) -> Self {
        debug_assert!(results.len() as i64 <= request.page_size());
        debug_assert!(row_count >= results.len() as i64);
        Self {
            current_page: request.page(),
            page_size: request.page_size(),
            row_count,
            results,
        }
    }

    /// Total number of pages
    pub fn page_count(&self) -> i64 {
        if self.page_size <= 0 {
            return 0;
        }
        self.row_count / self.page_size + i64::from(self.row_count % self.page_size != 0)
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.page_count()
    }

    pub fn has_prev(&self) -> bool {
        self.current_page > 1
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Transform every row, keeping the paging metadata
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> PagedResult<U> {
        PagedResult {
            current_page: self.current_page,
            page_size: self.page_size,
            row_count: self.row_count,
            results: self.results.into_iter().map(f).collect(),
        }
    }
}
