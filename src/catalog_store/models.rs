//! Catalog data models shared by the stores and the recommendation core.

use serde::Serialize;

pub type SongId = i64;
pub type AuthorId = i64;

/// A song as seen by the recommendation core.
///
/// Fetched per request and never mutated by the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SongSummary {
    pub id: SongId,
    pub title: String,
    pub genres: Vec<String>,
    pub author_id: AuthorId,
    pub view_count: u64,
}

/// A window over an ordered result set.
///
/// `total` is the size of the whole result set, not of `items`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub size: usize,
    pub total: usize,
}

impl<T> Page<T> {
    pub fn empty(page: usize, size: usize, total: usize) -> Self {
        Self {
            items: Vec::new(),
            page,
            size,
            total,
        }
    }

    /// Cuts the `page`-th window of `size` items out of a fully materialized list.
    /// A window starting past the end yields no items but still reports the total.
    pub fn slice(all: Vec<T>, page: usize, size: usize) -> Self {
        let total = all.len();
        let start = page.saturating_mul(size);
        if start >= total {
            return Self::empty(page, size, total);
        }
        let items = all.into_iter().skip(start).take(size).collect();
        Self {
            items,
            page,
            size,
            total,
        }
    }

    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total: self.total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slices_middle_page() {
        let page = Page::slice((0..10).collect::<Vec<_>>(), 1, 3);
        assert_eq!(page.items, vec![3, 4, 5]);
        assert_eq!(page.total, 10);
        assert_eq!(page.page, 1);
        assert_eq!(page.size, 3);
    }

    #[test]
    fn slices_partial_last_page() {
        let page = Page::slice((0..10).collect::<Vec<_>>(), 3, 3);
        assert_eq!(page.items, vec![9]);
        assert_eq!(page.total, 10);
    }

    #[test]
    fn offset_past_end_is_empty_with_total() {
        let page = Page::slice((0..4).collect::<Vec<_>>(), 2, 2);
        assert!(page.items.is_empty());
        assert_eq!(page.total, 4);

        let huge = Page::slice(vec![1, 2, 3], usize::MAX, 10);
        assert!(huge.items.is_empty());
        assert_eq!(huge.total, 3);
    }
}
