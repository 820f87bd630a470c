//! Shared response types for paginated API handlers.
//!
//! List endpoints return a [`Page`] envelope so clients can render pagers
//! without a second count request. Use [`Page::new`] instead of ad-hoc
//! `serde_json::json!` maps to keep the field set consistent.

use serde::Serialize;

/// Standard pagination envelope for list endpoints.
#[derive(Debug, Serialize)]
pub struct Page<T: Serialize> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub pages: i64,
}

impl<T: Serialize> Page<T> {
    /// Assemble a page, deriving `pages` from `total` and `page_size`.
    pub fn new(items: Vec<T>, total: i64, page: i64, page_size: i64) -> Self {
        Self {
            items,
            total,
            page,
            page_size,
            pages: page_count(total, page_size),
        }
    }
}

/// Number of pages for `total` rows at `page_size` rows per page.
///
/// An empty result set still has one (empty) page so clients never see
/// `pages: 0`.
pub fn page_count(total: i64, page_size: i64) -> i64 {
    if total == 0 {
        1
    } else {
        (total + page_size - 1) / page_size
    }
}
