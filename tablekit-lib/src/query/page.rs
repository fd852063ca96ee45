//! Pagination of a view.

use std::fmt;
use std::ops::Range;

use crate::error::PageError;

/// Page size used when a table does not choose one.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Page sizes offered when a table does not choose its own.
pub const DEFAULT_PAGE_SIZE_OPTIONS: [usize; 4] = [5, 10, 25, 50];

/// Index range of a page window, clamped to `0..total`.
///
/// Pages past the end produce an empty range at `total`.
pub fn page_window(total: usize, page: usize, page_size: usize) -> Range<usize> {
    let start = page.saturating_mul(page_size).min(total);
    let end = start.saturating_add(page_size).min(total);
    start..end
}

/// Slices one page out of `items`.
///
/// Never fails: a page beyond the end or a zero page size gives an empty
/// slice.
///
/// ```
/// use tablekit_lib::query::paginate;
///
/// let rows: Vec<u32> = (1..=23).collect();
/// assert_eq!(paginate(&rows, 0, 10).len(), 10);
/// assert_eq!(paginate(&rows, 2, 10), &[21, 22, 23]);
/// assert!(paginate(&rows, 3, 10).is_empty());
/// ```
pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    &items[page_window(items.len(), page, page_size)]
}

/// Current page and page size of a table.
///
/// Pages are zero-based. The page size is always one of the offered
/// options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    page: usize,
    page_size: usize,
    options: Vec<usize>,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 0,
            page_size: DEFAULT_PAGE_SIZE,
            options: DEFAULT_PAGE_SIZE_OPTIONS.to_vec(),
        }
    }
}

impl Pagination {
    /// Creates pagination at page 0.
    pub fn new(page_size: usize, options: impl Into<Vec<usize>>) -> Result<Self, PageError> {
        let options = options.into();
        if page_size == 0 || !options.contains(&page_size) {
            return Err(PageError::unsupported(page_size, &options));
        }
        Ok(Self {
            page: 0,
            page_size,
            options,
        })
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// The page sizes a user may choose from.
    pub fn options(&self) -> &[usize] {
        &self.options
    }

    /// Moves to `page`. Pages past the end show no rows.
    pub fn set_page(&mut self, page: usize) {
        self.page = page;
    }

    /// Changes the page size and returns to the first page.
    pub fn set_page_size(&mut self, page_size: usize) -> Result<(), PageError> {
        if page_size == 0 || !self.options.contains(&page_size) {
            return Err(PageError::unsupported(page_size, &self.options));
        }
        self.page_size = page_size;
        self.page = 0;
        Ok(())
    }

    /// Returns to the first page.
    pub fn reset(&mut self) {
        self.page = 0;
    }

    /// Number of pages needed for `total` rows.
    pub fn page_count(&self, total: usize) -> usize {
        total.div_ceil(self.page_size)
    }

    /// Index of the last page for `total` rows (0 when there are none).
    pub fn last_page_index(&self, total: usize) -> usize {
        self.page_count(total).saturating_sub(1)
    }

    /// Advances one page. Returns `false` on the last page.
    pub fn next(&mut self, total: usize) -> bool {
        if self.page < self.last_page_index(total) {
            self.page += 1;
            true
        } else {
            false
        }
    }

    /// Goes back one page. Returns `false` on the first page.
    pub fn prev(&mut self) -> bool {
        if self.page > 0 {
            self.page -= 1;
            true
        } else {
            false
        }
    }

    /// Jumps to the last page.
    pub fn last(&mut self, total: usize) {
        self.page = self.last_page_index(total);
    }

    /// Pulls the page back inside `total` rows if it has fallen past the end.
    pub fn clamp(&mut self, total: usize) {
        self.page = self.page.min(self.last_page_index(total));
    }

    /// Index range of the current page.
    pub fn window(&self, total: usize) -> Range<usize> {
        page_window(total, self.page, self.page_size)
    }

    /// Slices the current page out of `items`.
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        paginate(items, self.page, self.page_size)
    }

    /// Position summary for `total` rows.
    pub fn info(&self, total: usize) -> PageInfo {
        let window = self.window(total);
        PageInfo {
            from: if window.is_empty() { 0 } else { window.start + 1 },
            to: window.end,
            count: total,
            page: self.page,
            page_count: self.page_count(total),
        }
    }
}

/// Where the current page sits in the view.
///
/// Displays as the range label shown under a table, `"11-20 of 45"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
    /// One-based index of the first row on the page, 0 when it is empty.
    pub from: usize,
    /// One-based index of the last row on the page.
    pub to: usize,
    /// Rows in the whole view.
    pub count: usize,
    pub page: usize,
    pub page_count: usize,
}

impl PageInfo {
    pub fn has_next(&self) -> bool {
        self.page + 1 < self.page_count
    }

    pub fn has_prev(&self) -> bool {
        self.page > 0
    }
}

impl fmt::Display for PageInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{} of {}", self.from, self.to, self.count)
    }
}
