//! Query parameter types shared by several handler modules.

use serde::Deserialize;

/// Generic pagination parameters (`?page=&page_size=`).
///
/// Pages are 1-based. Use [`PageParams::resolve`] to apply defaults and
/// clamp out-of-range values before hitting the repository layer.
#[derive(Debug, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl PageParams {
    /// Resolve raw query values into a `(page, page_size)` pair.
    ///
    /// `page` is floored at 1; `page_size` falls back to `default_size` and
    /// is clamped to `1..=max_size`.
    pub fn resolve(&self, default_size: i64, max_size: i64) -> (i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let page_size = self.page_size.unwrap_or(default_size).clamp(1, max_size);
        (page, page_size)
    }
}
