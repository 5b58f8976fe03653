use std::cell::RefCell;
use std::io;
use std::rc::Rc;

use tracing::debug;

use super::export::{self, ExportFormat, ExportPayload};
use super::filter::filter_rows;
use super::paginate::{paginate, PageInfo, PageSize, PageState};
use super::sort::{sort_rows, SortState};
use super::table::{Row, Table};

/// Filtered+sorted indices, remembered with the inputs they were computed from
#[derive(Debug)]
struct ViewCache {
    table: Rc<Table>,
    query: String,
    sort: SortState,
    rows: Rc<[usize]>,
}

/// The rows on the current page, in display order
#[derive(Debug)]
pub struct VisiblePage<'a> {
    pub rows: Vec<&'a Row>,
    pub info: PageInfo,
}

/// One exploration session over a loaded table.
///
/// Holds the query, sort and page state; every action is one transition that leaves
/// the page clamped to the current view. The filtered/sorted view is derived on
/// demand and memoized on (table, query, sort).
#[derive(Debug)]
pub struct Explorer {
    table: Rc<Table>,
    query: String,
    sort: SortState,
    page: PageState,
    default_page_size: PageSize,
    cache: RefCell<Option<ViewCache>>,
}

impl Explorer {
    pub fn new(table: Table, page_size: PageSize) -> Self {
        Self {
            table: Rc::new(table),
            query: String::new(),
            sort: SortState::Unsorted,
            page: PageState::new(page_size),
            default_page_size: page_size,
            cache: RefCell::new(None),
        }
    }

    /// Replace the table; query, sort and page all go back to their defaults
    pub fn load(&mut self, table: Table) {
        debug!(rows = table.row_count(), cols = table.col_count(), "Loading table into explorer");
        *self = Self::new(table, self.default_page_size);
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn headers(&self) -> &[String] {
        self.table.headers()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn sort(&self) -> &SortState {
        &self.sort
    }

    pub fn page_state(&self) -> PageState {
        self.page
    }

    // === Query ===

    pub fn set_query(&mut self, query: &str) {
        if self.query == query {
            return;
        }
        self.query = query.to_string();
        self.page.first();
    }

    pub fn push_query_char(&mut self, c: char) {
        self.query.push(c);
        self.page.first();
    }

    pub fn pop_query_char(&mut self) {
        if self.query.pop().is_some() {
            self.page.first();
        }
    }

    pub fn clear_query(&mut self) {
        self.set_query("");
    }

    // === Sort ===

    /// Header click on `col`
    pub fn toggle_sort(&mut self, col: &str) {
        if self.table.column_index(col).is_none() {
            return;
        }
        self.sort = self.sort.toggle(col);
        self.clamp_page();
    }

    /// Header click by column position
    pub fn toggle_sort_at(&mut self, col: usize) {
        if let Some(name) = self.table.headers().get(col).cloned() {
            self.toggle_sort(&name);
        }
    }

    pub fn clear_sort(&mut self) {
        self.sort = SortState::Unsorted;
        self.clamp_page();
    }

    // === Pages ===

    pub fn set_page_size(&mut self, size: PageSize) {
        self.page.set_page_size(size);
    }

    pub fn cycle_page_size(&mut self) {
        self.set_page_size(self.page.page_size.next());
    }

    pub fn next_page(&mut self) {
        let count = self.match_count();
        self.page.next(count);
    }

    pub fn prev_page(&mut self) {
        self.page.prev();
    }

    pub fn first_page(&mut self) {
        self.page.first();
    }

    pub fn last_page(&mut self) {
        let count = self.match_count();
        self.page.last(count);
    }

    fn clamp_page(&mut self) {
        let count = self.match_count();
        self.page.clamp(count);
    }

    // === Derived views ===

    /// Indices of the filtered rows in sort order
    pub fn ordered_rows(&self) -> Rc<[usize]> {
        let mut cache = self.cache.borrow_mut();

        if let Some(hit) = cache.as_ref() {
            if Rc::ptr_eq(&hit.table, &self.table) && hit.query == self.query && hit.sort == self.sort {
                return hit.rows.clone();
            }
        }

        let rows: Rc<[usize]> = self.compute_rows().into();
        *cache = Some(ViewCache {
            table: self.table.clone(),
            query: self.query.clone(),
            sort: self.sort.clone(),
            rows: rows.clone(),
        });
        rows
    }

    /// The same view as [`Explorer::ordered_rows`], computed without the cache
    pub fn compute_rows(&self) -> Vec<usize> {
        let filtered = filter_rows(&self.table, &self.query);
        sort_rows(&self.table, &filtered, &self.sort)
    }

    /// Number of rows matching the query
    pub fn match_count(&self) -> usize {
        self.ordered_rows().len()
    }

    pub fn is_empty_result(&self) -> bool {
        self.match_count() == 0
    }

    pub fn page_info(&self) -> PageInfo {
        let rows = self.ordered_rows();
        paginate(&rows, &self.page).info
    }

    pub fn visible_page(&self) -> VisiblePage<'_> {
        let ordered = self.ordered_rows();
        let page = paginate(&ordered, &self.page);
        let rows = self.table.rows();

        VisiblePage {
            rows: page.items.iter().map(|&idx| &rows[idx]).collect(),
            info: page.info,
        }
    }

    #[cfg(test)]
    pub fn visible_rows(&self) -> Vec<&Row> {
        self.visible_page().rows
    }

    /// Export every filtered row (not only the current page) in sort order
    pub fn export(&self, format: ExportFormat, delimiter: u8) -> io::Result<Option<ExportPayload>> {
        let ordered = self.ordered_rows();
        let rows = self.table.rows();
        export::export(
            self.table.headers(),
            ordered.iter().map(|&idx| &rows[idx]),
            format,
            delimiter,
        )
    }
}
