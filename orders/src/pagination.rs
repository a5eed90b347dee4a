//! Fixed-size paging over the fetched order set.
//!
//! Pages are 1-indexed. The page count is never below 1, so an empty set
//! still has a (blank) first page.

/// Orders shown per page unless configured otherwise
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Page size and current page
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    page_size: usize,
    current_page: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl Pagination {
    /// Start on page 1 with `page_size` items per page (at least 1)
    #[must_use]
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            current_page: 1,
        }
    }

    /// Items per page
    #[must_use]
    pub const fn page_size(&self) -> usize {
        self.page_size
    }

    /// Current page, 1-indexed
    #[must_use]
    pub const fn current_page(&self) -> usize {
        self.current_page
    }

    /// `ceil(len / page_size)`, minimum 1
    #[must_use]
    pub const fn page_count(&self, len: usize) -> usize {
        if len == 0 { 1 } else { len.div_ceil(self.page_size) }
    }

    /// The slice of `items` on the current page
    ///
    /// Empty when the current page lies past the end of `items`.
    #[must_use]
    pub fn visible<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = (self.current_page - 1)
            .saturating_mul(self.page_size)
            .min(items.len());
        let end = start.saturating_add(self.page_size).min(items.len());
        &items[start..end]
    }

    /// Jump to page `page`.
    ///
    /// Out-of-range pages are rejected and leave the state unchanged.
    pub fn go_to(&mut self, page: usize, len: usize) -> bool {
        if (1..=self.page_count(len)).contains(&page) {
            self.current_page = page;
            true
        } else {
            false
        }
    }

    /// Advance one page; no-op on the last page
    pub fn next(&mut self, len: usize) -> bool {
        if self.has_next(len) {
            self.current_page += 1;
            true
        } else {
            false
        }
    }

    /// Go back one page; no-op on the first page
    pub const fn prev(&mut self) -> bool {
        if self.has_prev() {
            self.current_page -= 1;
            true
        } else {
            false
        }
    }

    /// Whether a later page exists
    #[must_use]
    pub const fn has_next(&self, len: usize) -> bool {
        self.current_page < self.page_count(len)
    }

    /// Whether an earlier page exists
    #[must_use]
    pub const fn has_prev(&self) -> bool {
        self.current_page > 1
    }

    /// Back to page 1
    pub const fn reset(&mut self) {
        self.current_page = 1;
    }
}
