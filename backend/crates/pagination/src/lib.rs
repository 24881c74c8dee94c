//! Page/limit pagination primitives shared by Pitchside list endpoints.
//!
//! Inbound adapters parse optional `page` and `limit` query values into a
//! [`PageRequest`], domain services hand the request to repositories as an
//! offset/limit pair, and handlers wrap the resulting slice in a [`Page`]
//! envelope:
//!
//! ```json
//! {"data": [], "page": 1, "limit": 20, "total": 0, "totalPages": 0}
//! ```

use serde::{Deserialize, Serialize};

/// Page number used when the caller omits `page`.
pub const DEFAULT_PAGE: u64 = 1;
/// Page size used when the caller omits `limit`.
pub const DEFAULT_LIMIT: u64 = 20;
/// Largest page size a caller may request.
pub const MAX_LIMIT: u64 = 100;

/// Validation failures for raw pagination inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PageRequestError {
    /// `page` was zero.
    #[error("page must be at least 1")]
    PageOutOfRange,
    /// `limit` was zero or above [`MAX_LIMIT`].
    #[error("limit must be between 1 and {max}")]
    LimitOutOfRange {
        /// Upper bound accepted for `limit`.
        max: u64,
    },
}

/// Validated one-based page request.
///
/// ## Invariants
/// - `page >= 1`
/// - `1 <= limit <= MAX_LIMIT`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u64,
    limit: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageRequest {
    /// Validate optional page and limit values, applying defaults.
    ///
    /// # Errors
    /// Returns [`PageRequestError`] when either value is out of range.
    ///
    /// # Examples
    /// ```
    /// use pagination::PageRequest;
    ///
    /// let request = PageRequest::try_new(Some(3), None).expect("valid page");
    /// assert_eq!(request.offset(), 40);
    /// ```
    pub const fn try_new(page: Option<u64>, limit: Option<u64>) -> Result<Self, PageRequestError> {
        let page = match page {
            Some(value) => value,
            None => DEFAULT_PAGE,
        };
        let limit = match limit {
            Some(value) => value,
            None => DEFAULT_LIMIT,
        };
        if page == 0 {
            return Err(PageRequestError::PageOutOfRange);
        }
        if limit == 0 || limit > MAX_LIMIT {
            return Err(PageRequestError::LimitOutOfRange { max: MAX_LIMIT });
        }
        Ok(Self { page, limit })
    }

    /// One-based page number.
    #[must_use]
    pub const fn page(&self) -> u64 {
        self.page
    }

    /// Maximum number of items on the page.
    #[must_use]
    pub const fn limit(&self) -> u64 {
        self.limit
    }

    /// Number of items skipped before this page starts.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

/// Page envelope returned by list endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Items on the current page.
    pub data: Vec<T>,
    /// One-based page number.
    pub page: u64,
    /// Requested page size.
    pub limit: u64,
    /// Number of items across all pages.
    pub total: u64,
    /// Number of pages needed for `total` items.
    pub total_pages: u64,
}

impl<T> Page<T> {
    /// Wrap one page of items with the totals needed by clients.
    #[must_use]
    pub const fn new(data: Vec<T>, request: PageRequest, total: u64) -> Self {
        Self {
            data,
            page: request.page,
            limit: request.limit,
            total,
            total_pages: total.div_ceil(request.limit),
        }
    }

    /// Convert every item while keeping the page metadata.
    #[must_use]
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            data: self.data.into_iter().map(f).collect(),
            page: self.page,
            limit: self.limit,
            total: self.total,
            total_pages: self.total_pages,
        }
    }
}
