//! Client-side pagination.
//!
//! Only the page-size choice is persisted; the current page always starts at 1.

use std::ops::Range;

use crate::store::{Aspect, TableStateStore};

pub const DEFAULT_PAGE_SIZE: usize = 25;
pub const DEFAULT_PAGE_SIZE_OPTIONS: [usize; 4] = [10, 25, 50, 100];

/// Pagination configuration.
#[derive(Debug, Clone)]
pub struct PaginationConfig {
    /// Page size used when nothing is stored.
    ///
    /// Default: 25
    pub default_page_size: usize,

    /// Sizes offered to the user.
    ///
    /// Default: 10, 25, 50, 100
    pub page_size_options: Vec<usize>,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            page_size_options: DEFAULT_PAGE_SIZE_OPTIONS.to_vec(),
        }
    }
}

impl PaginationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_page_size(mut self, size: usize) -> Self {
        self.default_page_size = size.max(1);
        self
    }

    pub fn with_page_size_options(mut self, options: Vec<usize>) -> Self {
        self.page_size_options = options.into_iter().filter(|s| *s > 0).collect();
        self
    }
}

/// Pagination controller.
///
/// Invariant: `1 <= page <= total_pages()` after every operation.
#[derive(Debug, Clone)]
pub struct Pagination {
    page: usize,
    page_size: usize,
    total_items: usize,
    page_size_options: Vec<usize>,
    store: TableStateStore,
}

impl Pagination {
    /// Create a controller, restoring the stored page size if any.
    pub fn new(store: TableStateStore, config: PaginationConfig) -> Self {
        let page_size = store
            .load::<usize>(Aspect::Pagination)
            .filter(|size| *size >= 1)
            .unwrap_or(config.default_page_size.max(1));

        Self {
            page: 1,
            page_size,
            total_items: 0,
            page_size_options: config.page_size_options,
            store,
        }
    }

    /// Current page (1-based).
    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn page_size_options(&self) -> &[usize] {
        &self.page_size_options
    }

    pub fn total_items(&self) -> usize {
        self.total_items
    }

    /// Number of pages; at least 1 even when empty.
    pub fn total_pages(&self) -> usize {
        self.total_items.div_ceil(self.page_size).max(1)
    }

    /// 1-based index of the first item on the page, 0 when empty.
    pub fn start_index(&self) -> usize {
        if self.total_items == 0 {
            0
        } else {
            (self.page - 1) * self.page_size + 1
        }
    }

    /// 1-based index of the last item on the page, 0 when empty.
    pub fn end_index(&self) -> usize {
        (self.page * self.page_size).min(self.total_items)
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    /// 0-based item range of the current page.
    pub fn range(&self) -> Range<usize> {
        let start = ((self.page - 1) * self.page_size).min(self.total_items);
        let end = (start + self.page_size).min(self.total_items);
        start..end
    }

    /// Slice of `items` shown on the current page.
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let range = self.range();
        let end = range.end.min(items.len());
        let start = range.start.min(end);
        &items[start..end]
    }

    /// Update the item count, clamping the page down if the data shrank.
    pub fn set_total(&mut self, total_items: usize) {
        self.total_items = total_items;
        let total_pages = self.total_pages();
        if self.page > total_pages {
            log::debug!("[pagination] clamping page {} to {}", self.page, total_pages);
            self.page = total_pages;
        }
    }

    /// Go to a page, clamped to `[1, total_pages]`.
    pub fn set_page(&mut self, page: usize) {
        self.page = page.clamp(1, self.total_pages());
    }

    /// Change the page size. Resets to page 1 and persists the choice.
    pub fn set_page_size(&mut self, page_size: usize) {
        if page_size == 0 {
            log::debug!("[pagination] ignoring page size 0");
            return;
        }
        self.page_size = page_size;
        self.page = 1;
        self.store.save(Aspect::Pagination, &page_size);
    }

    pub fn next(&mut self) {
        self.set_page(self.page + 1);
    }

    pub fn prev(&mut self) {
        self.set_page(self.page.saturating_sub(1));
    }

    pub fn first(&mut self) {
        self.page = 1;
    }

    pub fn last(&mut self) {
        self.page = self.total_pages();
    }
}
