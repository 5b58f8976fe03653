//! Fixed-size pages over an ordered row sequence.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The selectable page sizes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub enum PageSize {
    Ten,
    TwentyFive,
    #[default]
    Fifty,
    Hundred,
}

impl PageSize {
    pub const ALL: [PageSize; 4] = [PageSize::Ten, PageSize::TwentyFive, PageSize::Fifty, PageSize::Hundred];

    pub fn get(self) -> usize {
        match self {
            PageSize::Ten => 10,
            PageSize::TwentyFive => 25,
            PageSize::Fifty => 50,
            PageSize::Hundred => 100,
        }
    }

    pub fn from_count(n: usize) -> Option<Self> {
        Self::ALL.into_iter().find(|size| size.get() == n)
    }

    /// The next larger size, wrapping back to the smallest
    pub fn next(self) -> Self {
        match self {
            PageSize::Ten => PageSize::TwentyFive,
            PageSize::TwentyFive => PageSize::Fifty,
            PageSize::Fifty => PageSize::Hundred,
            PageSize::Hundred => PageSize::Ten,
        }
    }
}

impl TryFrom<usize> for PageSize {
    type Error = String;

    fn try_from(n: usize) -> Result<Self, Self::Error> {
        PageSize::from_count(n).ok_or_else(|| format!("invalid page size {} (expected 10, 25, 50 or 100)", n))
    }
}

impl From<PageSize> for usize {
    fn from(size: PageSize) -> usize {
        size.get()
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}

/// Number of pages for `count` rows; at least 1 so an empty view reads "page 1 of 1"
pub fn total_pages(count: usize, size: PageSize) -> usize {
    page_count(count, size.get())
}

/// [`total_pages`] for an arbitrary page length
pub fn page_count(count: usize, size: usize) -> usize {
    count.div_ceil(size.max(1)).max(1)
}

/// Current page (1-based) and page size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageState {
    pub current_page: usize,
    pub page_size: PageSize,
}

impl Default for PageState {
    fn default() -> Self {
        Self::new(PageSize::default())
    }
}

impl PageState {
    pub fn new(page_size: PageSize) -> Self {
        Self { current_page: 1, page_size }
    }

    /// Pull the current page into `[1, total_pages(count)]`
    pub fn clamp(&mut self, count: usize) {
        self.current_page = self.current_page.clamp(1, total_pages(count, self.page_size));
    }

    pub fn next(&mut self, count: usize) {
        self.current_page = (self.current_page + 1).min(total_pages(count, self.page_size));
    }

    pub fn prev(&mut self) {
        self.current_page = self.current_page.saturating_sub(1).max(1);
    }

    pub fn first(&mut self) {
        self.current_page = 1;
    }

    pub fn last(&mut self, count: usize) {
        self.current_page = total_pages(count, self.page_size);
    }

    /// Change the page size; the view restarts at page 1
    pub fn set_page_size(&mut self, size: PageSize) {
        self.page_size = size;
        self.current_page = 1;
    }
}

/// Metadata describing one page of a view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
    pub current_page: usize,
    pub total_pages: usize,
    /// Rows in the whole (filtered) view
    pub total_rows: usize,
    /// 1-based position of the first row on the page, 0 when the page is empty
    pub first_row: usize,
    /// 1-based position of the last row on the page, 0 when the page is empty
    pub last_row: usize,
}

impl PageInfo {
    pub fn has_prev(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }
}

/// A page: a borrowed slice of the view and its metadata
#[derive(Debug, Clone, Copy)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    pub info: PageInfo,
}

/// Slice `rows` to the page selected by `state`.
///
/// A state pointing outside `[1, total_pages]` is clamped first.
pub fn paginate<'a, T>(rows: &'a [T], state: &PageState) -> Page<'a, T> {
    page_of(rows, state.current_page, state.page_size.get())
}

/// Page `current_page` of `rows` cut into pages of `size` rows
pub fn page_of<T>(rows: &[T], current_page: usize, size: usize) -> Page<'_, T> {
    let size = size.max(1);
    let total = page_count(rows.len(), size);
    let current = current_page.clamp(1, total);

    let start = ((current - 1) * size).min(rows.len());
    let end = (current * size).min(rows.len());
    let items = &rows[start..end];

    let (first_row, last_row) = if items.is_empty() { (0, 0) } else { (start + 1, end) };

    Page {
        items,
        info: PageInfo {
            current_page: current,
            total_pages: total,
            total_rows: rows.len(),
            first_row,
            last_row,
        },
    }
}
