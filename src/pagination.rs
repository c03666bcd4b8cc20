//! "Fetch N+1, return N" pagination
//!
//! Listings ask their backend for one item more than the page size; the extra
//! item only tells us whether another page exists and is never returned.

use serde::Serialize;

/// Page size used when the caller does not ask for one
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Page size for an optional `first` argument; negative values mean zero
pub fn limit_or_default(first: Option<i32>) -> usize {
    limit_or(first, DEFAULT_PAGE_SIZE)
}

/// Page size for an optional `first` argument with a custom default
pub fn limit_or(first: Option<i32>, default: usize) -> usize {
    match first {
        None => default,
        Some(n) => usize::try_from(n).unwrap_or(0),
    }
}

/// A requested page window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationWindow {
    limit: usize,
}

impl PaginationWindow {
    /// Window for `first`, defaulting to [`DEFAULT_PAGE_SIZE`]
    pub fn new(first: Option<i32>) -> Self {
        Self {
            limit: limit_or_default(first),
        }
    }

    /// Window for `first`, defaulting to `default`
    pub fn with_default(first: Option<i32>, default: usize) -> Self {
        Self {
            limit: limit_or(first, default),
        }
    }

    /// Number of items on a page
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Number of items to fetch from the backend
    pub fn request_size(&self) -> usize {
        self.limit.saturating_add(1)
    }

    /// Whether a fetched result set spills onto a further page
    pub fn has_next_page(&self, fetched: usize) -> bool {
        fetched > self.limit
    }

    /// Cut fetched items down to one page
    pub fn paginate<T>(&self, mut items: Vec<T>) -> Page<T> {
        let has_next_page = self.has_next_page(items.len());
        if has_next_page {
            items.truncate(self.limit);
        }
        Page {
            items,
            has_next_page,
        }
    }
}

/// One page of results
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub has_next_page: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_size_adds_one() {
        assert_eq!(PaginationWindow::new(None).request_size(), 101);
        assert_eq!(PaginationWindow::new(Some(50)).request_size(), 51);
        assert_eq!(PaginationWindow::with_default(None, 7).request_size(), 8);
    }

    #[test]
    fn test_paginate_with_next_page() {
        let items: Vec<usize> = (0..=100).collect();
        let page = PaginationWindow::new(Some(50)).paginate(items);
        assert_eq!(page.items.len(), 50);
        assert!(page.has_next_page);
        assert_eq!(page.items[49], 49);
    }

    #[test]
    fn test_paginate_last_page() {
        let items: Vec<usize> = (0..10).collect();
        let page = PaginationWindow::new(Some(50)).paginate(items);
        assert_eq!(page.items.len(), 10);
        assert!(!page.has_next_page);
    }

    #[test]
    fn test_exactly_limit_has_no_next_page() {
        let page = PaginationWindow::new(Some(3)).paginate(vec![1, 2, 3]);
        assert_eq!(page.items, vec![1, 2, 3]);
        assert!(!page.has_next_page);
    }

    #[test]
    fn test_negative_first_is_zero() {
        let window = PaginationWindow::new(Some(-5));
        assert_eq!(window.limit(), 0);
        let page = window.paginate(vec!["a"]);
        assert!(page.items.is_empty());
        assert!(page.has_next_page);
    }
}
