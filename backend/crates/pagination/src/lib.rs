//! Page-number pagination primitives shared by list endpoints.
//!
//! A [`PageRequest`] describes which fixed-size window of an ordered result
//! set a caller wants. Adapters translate it into `LIMIT`/`OFFSET` (or an
//! in-memory slice) and report the pre-pagination row count back through a
//! [`PageMeta`], which also derives `total_pages`.
//!
//! ```
//! use pagination::{PageMeta, PageRequest};
//!
//! let request = PageRequest::new(2, 6).expect("valid window");
//! assert_eq!(request.offset(), 6);
//!
//! let meta = PageMeta::new(request, 8);
//! assert_eq!(meta.total_pages, 2);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when constructing a [`PageRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PageRequestError {
    /// Pages are numbered from one.
    #[error("page must be at least 1, got {page}")]
    PageOutOfRange {
        /// Rejected page number.
        page: i64,
    },
    /// A window must hold at least one item.
    #[error("page size must be at least 1")]
    EmptyPageSize,
}

/// A 1-based page number and a fixed page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageRequest {
    page: u32,
    per_page: u32,
}

impl PageRequest {
    /// Build a request, rejecting page numbers below one and empty windows.
    ///
    /// The page number is accepted as `i64` so callers can pass untrusted
    /// parsed input straight through and receive a typed error.
    ///
    /// # Errors
    ///
    /// Returns [`PageRequestError::PageOutOfRange`] when `page` is below one
    /// or does not fit in `u32`, and [`PageRequestError::EmptyPageSize`] when
    /// `per_page` is zero.
    pub fn new(page: i64, per_page: u32) -> Result<Self, PageRequestError> {
        if per_page == 0 {
            return Err(PageRequestError::EmptyPageSize);
        }
        let page = u32::try_from(page)
            .ok()
            .filter(|value| *value >= 1)
            .ok_or(PageRequestError::PageOutOfRange { page })?;
        Ok(Self { page, per_page })
    }

    /// First page with the given size.
    ///
    /// # Errors
    ///
    /// Returns [`PageRequestError::EmptyPageSize`] when `per_page` is zero.
    pub fn first(per_page: u32) -> Result<Self, PageRequestError> {
        Self::new(1, per_page)
    }

    /// The 1-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Number of items per page.
    #[must_use]
    pub const fn per_page(&self) -> u32 {
        self.per_page
    }

    /// Number of items to skip before this window starts.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.per_page as u64
    }

    /// Maximum number of items in this window.
    #[must_use]
    pub const fn limit(&self) -> u64 {
        self.per_page as u64
    }
}

/// Pagination envelope fields reported alongside a window of items.
///
/// Serialises with snake_case keys so it can be flattened into list
/// responses: `{"total": 8, "page": 2, "per_page": 6, "total_pages": 2}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    /// Number of matching items before pagination.
    pub total: u64,
    /// The 1-based page number that was served.
    pub page: u32,
    /// Page size used for the window.
    pub per_page: u32,
    /// `ceil(total / per_page)`; zero when nothing matched.
    pub total_pages: u64,
}

impl PageMeta {
    /// Derive the envelope for `request` given the pre-pagination total.
    #[must_use]
    pub const fn new(request: PageRequest, total: u64) -> Self {
        Self {
            total,
            page: request.page,
            per_page: request.per_page,
            total_pages: total_pages(total, request.per_page),
        }
    }
}

/// A window of items together with its pagination envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// Items in this window, in result order.
    pub items: Vec<T>,
    /// Envelope describing the window.
    pub meta: PageMeta,
}

impl<T> Page<T> {
    /// Pair a window of items with its envelope.
    #[must_use]
    pub const fn new(items: Vec<T>, meta: PageMeta) -> Self {
        Self { items, meta }
    }

    /// Transform each item while keeping the envelope.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            meta: self.meta,
        }
    }

    /// Slice an already ordered, fully materialised result set.
    ///
    /// Used by in-memory adapters; database adapters push the window into
    /// the query instead.
    #[must_use]
    pub fn from_ordered(all: Vec<T>, request: PageRequest) -> Self {
        let total = all.len() as u64;
        let skip = usize::try_from(request.offset()).unwrap_or(usize::MAX);
        let take = usize::try_from(request.limit()).unwrap_or(usize::MAX);
        let items = all.into_iter().skip(skip).take(take).collect();
        Self::new(items, PageMeta::new(request, total))
    }
}

/// Number of pages needed to hold `total` items at `per_page` items each.
#[must_use]
pub const fn total_pages(total: u64, per_page: u32) -> u64 {
    if per_page == 0 {
        return 0;
    }
    total.div_ceil(per_page as u64)
}

#[cfg(test)]
mod tests {
    //! Unit coverage for page windows and envelopes.

    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(0, 6, 0)]
    #[case(1, 6, 1)]
    #[case(6, 6, 1)]
    #[case(7, 6, 2)]
    #[case(12, 6, 2)]
    #[case(13, 6, 3)]
    fn total_pages_rounds_up(#[case] total: u64, #[case] per_page: u32, #[case] expected: u64) {
        assert_eq!(total_pages(total, per_page), expected);
    }

    #[rstest]
    #[case(0)]
    #[case(-3)]
    #[case(i64::from(u32::MAX) + 1)]
    fn page_numbers_outside_range_are_rejected(#[case] page: i64) {
        let err = PageRequest::new(page, 6).expect_err("page must be rejected");
        assert_eq!(err, PageRequestError::PageOutOfRange { page });
    }

    #[rstest]
    fn zero_page_size_is_rejected() {
        assert_eq!(
            PageRequest::new(1, 0),
            Err(PageRequestError::EmptyPageSize)
        );
    }

    #[rstest]
    #[case(1, 0)]
    #[case(2, 6)]
    #[case(5, 24)]
    fn offset_skips_previous_pages(#[case] page: i64, #[case] expected: u64) {
        let request = PageRequest::new(page, 6).expect("valid request");
        assert_eq!(request.offset(), expected);
        assert_eq!(request.limit(), 6);
    }

    #[rstest]
    fn from_ordered_serves_the_requested_window() {
        let request = PageRequest::new(2, 3).expect("valid request");
        let page = Page::from_ordered((1..=8).collect::<Vec<u32>>(), request);
        assert_eq!(page.items, vec![4, 5, 6]);
        assert_eq!(page.meta.total, 8);
        assert_eq!(page.meta.total_pages, 3);
    }

    #[rstest]
    fn from_ordered_past_the_end_is_empty() {
        let request = PageRequest::new(4, 3).expect("valid request");
        let page = Page::from_ordered(vec![1, 2, 3], request);
        assert!(page.items.is_empty());
        assert_eq!(page.meta.total, 3);
        assert_eq!(page.meta.page, 4);
    }

    #[rstest]
    fn concatenated_pages_cover_every_item_once() {
        let all: Vec<u32> = (0..17).collect();
        let first = PageRequest::first(6).expect("valid request");
        let pages = PageMeta::new(first, all.len() as u64).total_pages;
        let mut seen = Vec::new();
        for page in 1..=pages {
            let request = PageRequest::new(i64::try_from(page).expect("small"), 6)
                .expect("valid request");
            seen.extend(Page::from_ordered(all.clone(), request).items);
        }
        assert_eq!(seen, all);
    }

    #[rstest]
    fn meta_serialises_with_snake_case_keys() {
        let meta = PageMeta::new(PageRequest::new(1, 6).expect("valid request"), 0);
        let value = serde_json::to_value(meta).expect("serialise meta");
        assert_eq!(
            value,
            json!({ "total": 0, "page": 1, "per_page": 6, "total_pages": 0 })
        );
    }
}
