//! This modules defines the common functionality for paging data.

use serde::Serialize;

use crate::Error;

/// The config for pagination
#[derive(Debug, Clone)]
pub struct PaginationConfig {
    /// The page number to default to when not specified in a request.
    pub default_page: i64,
    /// The number of transactions per page when not specified in a request.
    pub default_page_size: i64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page: 1,
            default_page_size: 10,
        }
    }
}

/// A validated request for one page of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u64,
    per_page: u64,
}

impl PageRequest {
    /// Request the 1-based `page` with `per_page` items per page.
    ///
    /// # Errors
    /// Returns [Error::InvalidPageSize] if `per_page` is not positive and
    /// [Error::InvalidPage] if `page` is below one.
    pub fn new(page: i64, per_page: i64) -> Result<Self, Error> {
        if per_page <= 0 {
            return Err(Error::InvalidPageSize(per_page));
        }

        if page < 1 {
            return Err(Error::InvalidPage(page));
        }

        Ok(Self {
            page: page as u64,
            per_page: per_page as u64,
        })
    }

    /// The 1-based page number.
    pub fn page(self) -> u64 {
        self.page
    }

    /// The maximum number of items on the page.
    pub fn per_page(self) -> u64 {
        self.per_page
    }

    /// The number of items before the first item on the page.
    pub fn skip(self) -> u64 {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

/// Describes where a page sits in the full set of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// The number of results across all pages.
    pub total_documents: u64,
    /// The number of pages needed to show every result.
    pub total_pages: u64,
    /// The requested page.
    pub current_page: u64,
    /// The requested page size.
    pub per_page: u64,
}

impl Pagination {
    /// Describe `request` against `total_documents` results.
    pub fn new(total_documents: u64, request: PageRequest) -> Self {
        Self {
            total_documents,
            total_pages: total_documents.div_ceil(request.per_page()),
            current_page: request.page(),
            per_page: request.per_page(),
        }
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageResult<T> {
    /// The results on this page.
    pub items: Vec<T>,
    /// Where this page sits in the full set of results.
    pub pagination: Pagination,
}

/// Take the page described by `request` from `items`.
///
/// A page past the end is empty, but its metadata still counts every item.
pub fn paginate<T>(items: Vec<T>, request: PageRequest) -> PageResult<T> {
    let pagination = Pagination::new(items.len() as u64, request);
    let skip = usize::try_from(request.skip()).unwrap_or(usize::MAX);
    let take = usize::try_from(request.per_page()).unwrap_or(usize::MAX);

    PageResult {
        items: items.into_iter().skip(skip).take(take).collect(),
        pagination,
    }
}
