//! In-memory pagination with a capped page size.

use serde::Serialize;

/// Hard cap on page size. The whole filtered window is held in memory, so
/// callers never get more than this per page.
pub const MAX_LIMIT: usize = 100;

/// One page of results plus the metadata needed to walk the rest.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// Effective 1-based page number.
    pub page: usize,
    /// Effective page size.
    pub limit: usize,
    /// Number of pages, 0 when nothing matched.
    pub total_pages: usize,
    /// Items across all pages.
    pub total_fetched: usize,
    /// Whether a later page exists.
    pub has_more: bool,
}

/// Slices one page out of `items`.
///
/// `limit` is clamped to `1..=MAX_LIMIT`. `page` is clamped to at least 1
/// and at most the last page, so a page past the end returns the last
/// page rather than an empty one. An empty input yields page 1 of 0.
#[must_use]
pub fn paginate<T>(items: Vec<T>, page: usize, limit: usize) -> Page<T> {
    let limit = limit.clamp(1, MAX_LIMIT);
    let total_fetched = items.len();
    let total_pages = total_fetched.div_ceil(limit);
    let page = page.max(1).min(total_pages.max(1));

    let start = (page - 1) * limit;
    let items: Vec<T> = items.into_iter().skip(start).take(limit).collect();

    Page {
        items,
        page,
        limit,
        total_pages,
        total_fetched,
        has_more: page < total_pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_is_capped() {
        let page = paginate((0..250).collect::<Vec<u32>>(), 1, 1_000);
        assert_eq!(page.limit, MAX_LIMIT);
        assert_eq!(page.items.len(), MAX_LIMIT);
        assert_eq!(page.total_pages, 3);
        assert!(page.has_more);
    }

    #[test]
    fn zero_limit_and_page_are_raised_to_one() {
        let page = paginate(vec!['a', 'b'], 0, 0);
        assert_eq!((page.page, page.limit), (1, 1));
        assert_eq!(page.items, ['a']);
    }

    #[test]
    fn page_past_end_returns_last_page() {
        let page = paginate((1..=45).collect::<Vec<u32>>(), 99, 20);
        assert_eq!(page.page, 3);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.items, (41..=45).collect::<Vec<u32>>());
        assert!(!page.has_more);
    }

    #[test]
    fn middle_page() {
        let page = paginate((1..=45).collect::<Vec<u32>>(), 2, 20);
        assert_eq!(page.items.first(), Some(&21));
        assert_eq!(page.items.len(), 20);
        assert_eq!(page.total_fetched, 45);
        assert!(page.has_more);
    }

    #[test]
    fn empty_input() {
        let page = paginate(Vec::<u32>::new(), 5, 10);
        assert_eq!(page.page, 1);
        assert_eq!(page.total_pages, 0);
        assert_eq!(page.total_fetched, 0);
        assert!(page.items.is_empty());
        assert!(!page.has_more);
    }
}
