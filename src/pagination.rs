//! Pagination
//!
//! Page math shared by the list endpoints and the dashboards. Pages are
//! 1-based; asking for a page past the end yields an empty page that still
//! reports the correct totals.

use serde::{Deserialize, Serialize};

/// Default page size for list endpoints
pub const DEFAULT_PER_PAGE: usize = 20;

/// Largest page size a client may request
pub const MAX_PER_PAGE: usize = 100;

/// Number of pages needed for `total` items at `per_page` items per page.
///
/// Returns `None` when `per_page` is zero.
pub fn page_count(total: usize, per_page: usize) -> Option<usize> {
    if per_page == 0 {
        return None;
    }
    Some(total.div_ceil(per_page))
}

/// Query parameters accepted by every list endpoint
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageParams {
    #[serde(default)]
    pub page: Option<usize>,
    #[serde(default)]
    pub per_page: Option<usize>,
}

impl PageParams {
    pub fn new(page: usize, per_page: usize) -> Self {
        Self {
            page: Some(page),
            per_page: Some(per_page),
        }
    }

    /// Requested page, at least 1
    pub fn page(&self) -> usize {
        self.page.unwrap_or(1).max(1)
    }

    /// Requested page size clamped to `1..=MAX_PER_PAGE`
    pub fn per_page(&self) -> usize {
        self.per_page
            .unwrap_or(DEFAULT_PER_PAGE)
            .clamp(1, MAX_PER_PAGE)
    }
}

/// One page of a list plus enough metadata to render a pager
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub per_page: usize,
    pub total_items: usize,
    pub total_pages: usize,
    /// Pager hints for clients; always agree with [`Page::has_next`] and [`Page::has_prev`]
    #[serde(default)]
    pub has_next: bool,
    #[serde(default)]
    pub has_prev: bool,
}

impl<T> Page<T> {
    /// Cut page `page` (1-based) of size `per_page` out of `items`.
    ///
    /// A zero `per_page` is treated as 1 so the result is always a valid page.
    pub fn from_items(items: Vec<T>, page: usize, per_page: usize) -> Self {
        let per_page = per_page.max(1);
        let page = page.max(1);
        let total_items = items.len();
        let total_pages = total_items.div_ceil(per_page);

        let start = (page - 1).saturating_mul(per_page);
        let items = if start >= total_items {
            Vec::new()
        } else {
            items.into_iter().skip(start).take(per_page).collect()
        };

        Self {
            items,
            page,
            per_page,
            total_items,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1 && total_pages > 0,
        }
    }

    /// Paginate according to request parameters
    pub fn from_params(items: Vec<T>, params: &PageParams) -> Self {
        Self::from_items(items, params.page(), params.per_page())
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1 && self.total_pages > 0
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Transform the items, keeping the page metadata
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            per_page: self.per_page,
            total_items: self.total_items,
            total_pages: self.total_pages,
            has_next: self.has_next,
            has_prev: self.has_prev,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_count_is_ceiling() {
        assert_eq!(page_count(0, 10), Some(0));
        assert_eq!(page_count(1, 10), Some(1));
        assert_eq!(page_count(10, 10), Some(1));
        assert_eq!(page_count(11, 10), Some(2));
        assert_eq!(page_count(95, 20), Some(5));
        assert_eq!(page_count(5, 0), None);

        for n in 0..50 {
            for p in 1..12 {
                let expected = (n as f64 / p as f64).ceil() as usize;
                assert_eq!(page_count(n, p), Some(expected), "n={} p={}", n, p);
            }
        }
    }

    #[test]
    fn test_from_items() {
        let items: Vec<u32> = (1..=25).collect();

        let first = Page::from_items(items.clone(), 1, 10);
        assert_eq!(first.items, (1..=10).collect::<Vec<_>>());
        assert_eq!(first.total_pages, 3);
        assert!(first.has_next());
        assert!(!first.has_prev());

        let last = Page::from_items(items.clone(), 3, 10);
        assert_eq!(last.items, vec![21, 22, 23, 24, 25]);
        assert!(!last.has_next());
        assert!(last.has_prev());
    }

    #[test]
    fn test_out_of_range_page_is_empty() {
        let page = Page::from_items(vec![1, 2, 3], 5, 2);
        assert!(page.is_empty());
        assert_eq!(page.total_items, 3);
        assert_eq!(page.total_pages, 2);
        assert!(!page.has_next());
    }

    #[test]
    fn test_empty_list() {
        let page: Page<u8> = Page::from_items(Vec::new(), 1, 20);
        assert_eq!(page.total_pages, 0);
        assert!(!page.has_next());
        assert!(!page.has_prev());
    }

    #[test]
    fn test_params_clamping() {
        let params = PageParams::default();
        assert_eq!(params.page(), 1);
        assert_eq!(params.per_page(), DEFAULT_PER_PAGE);

        let params = PageParams::new(0, 1000);
        assert_eq!(params.page(), 1);
        assert_eq!(params.per_page(), MAX_PER_PAGE);

        let params = PageParams::new(2, 0);
        assert_eq!(params.per_page(), 1);
    }

    #[test]
    fn test_pager_hints_are_serialized() {
        let json = serde_json::to_value(Page::from_items(vec![1, 2, 3], 2, 1)).unwrap();
        assert_eq!(json["has_next"], true);
        assert_eq!(json["has_prev"], true);

        let json = serde_json::to_value(Page::from_items(vec![1, 2, 3], 1, 5)).unwrap();
        assert_eq!(json["has_next"], false);
        assert_eq!(json["has_prev"], false);
    }

    #[test]
    fn test_map_keeps_metadata() {
        let page = Page::from_items(vec![1, 2, 3], 2, 2).map(|n| n * 10);
        assert_eq!(page.items, vec![30]);
        assert_eq!(page.page, 2);
        assert_eq!(page.total_items, 3);
    }
}
