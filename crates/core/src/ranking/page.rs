//! Page assembly for ranked lists.
//!
//! Classifiers produce a fully ordered, deduplicated list; this module
//! clamps the caller's `(page, limit)` and slices it. Out-of-range input is
//! never an error: ranking is a best-effort read path.

use serde::{Deserialize, Serialize};

use crate::ranking::policy::DEFAULT_PAGE_LIMIT;

/// One page of a ranked list.
///
/// `total_count` is the size of the full filtered list before pagination,
/// not the number of items in storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_count: i64,
    pub page: i64,
    pub limit: i64,
}

impl<T> Page<T> {
    /// An empty page echoing the (clamped) request.
    pub fn empty(request: PageRequest) -> Self {
        Self {
            items: Vec::new(),
            total_count: 0,
            page: request.page,
            limit: request.limit,
        }
    }
}

/// A clamped page request: `page >= 0`, `1 <= limit <= max_page_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl PageRequest {
    pub fn clamped(page: Option<i64>, limit: Option<i64>, max_page_size: i64) -> Self {
        Self {
            page: clamp_page(page),
            limit: clamp_limit(limit, DEFAULT_PAGE_LIMIT, max_page_size),
        }
    }

    /// Index of the first item on this page. Saturates instead of overflowing.
    pub fn offset(&self) -> usize {
        usize::try_from(self.page.saturating_mul(self.limit)).unwrap_or(usize::MAX)
    }

    pub fn limit_usize(&self) -> usize {
        usize::try_from(self.limit).unwrap_or(usize::MAX)
    }
}

/// Clamp a user-provided limit to `[1, max]`, using `default` when absent.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    let max = max.max(1);
    limit.unwrap_or(default).clamp(1, max)
}

/// Clamp a user-provided page index to non-negative.
pub fn clamp_page(page: Option<i64>) -> i64 {
    page.unwrap_or(0).max(0)
}

/// Slice `[page * limit, page * limit + limit)` out of `ordered`.
///
/// Pages past the end come back empty with the same `total_count`.
pub fn paginate<T: Clone>(ordered: &[T], request: PageRequest) -> Page<T> {
    let start = request.offset().min(ordered.len());
    let end = start.saturating_add(request.limit_usize()).min(ordered.len());

    Page {
        items: ordered[start..end].to_vec(),
        total_count: ordered.len() as i64,
        page: request.page,
        limit: request.limit,
    }
}
