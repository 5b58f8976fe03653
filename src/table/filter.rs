use rayon::prelude::*;

use super::table::{Row, Table};
use super::PARALLEL_THRESHOLD;

/// Indices of the rows matching a free-text query, in table order.
///
/// Matching is a case-insensitive substring test against every header's value; a row
/// matches if any column does. An empty query keeps every row.
pub fn filter_rows(table: &Table, query: &str) -> Vec<usize> {
    let row_count = table.row_count();
    if query.is_empty() {
        return (0..row_count).collect();
    }

    let needle = query.to_lowercase();
    let col_count = table.col_count();
    let rows = table.rows();

    if row_count >= PARALLEL_THRESHOLD {
        (0..row_count)
            .into_par_iter()
            .filter(|&idx| row_matches(&rows[idx], col_count, &needle))
            .collect()
    } else {
        (0..row_count)
            .filter(|&idx| row_matches(&rows[idx], col_count, &needle))
            .collect()
    }
}

/// Whether any of the first `col_count` values contains `needle` (already lowercased)
pub fn row_matches(row: &Row, col_count: usize, needle: &str) -> bool {
    (0..col_count).any(|col| row.get(col).to_lowercase().contains(needle))
}
