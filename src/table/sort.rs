//! Sorting functionality for Table views

use std::cmp::Ordering;
use std::fmt;

use super::compare::compare_values;
use super::table::Table;
use super::PARALLEL_THRESHOLD;

/// Slices at or below this length are insertion sorted
const INSERTION_THRESHOLD: usize = 16;

/// Sorting direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn name(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "ascending",
            SortDirection::Descending => "descending",
        }
    }
}

/// Sort state of a view: either original table order, or one column in one direction
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum SortState {
    #[default]
    Unsorted,
    Ascending(String),
    Descending(String),
}

impl SortState {
    /// Transition for a click on the header `col`.
    ///
    /// Unsorted -> Ascending -> Descending -> Unsorted on the same column; picking a
    /// different column always restarts at Ascending.
    pub fn toggle(&self, col: &str) -> SortState {
        match self {
            SortState::Ascending(current) if current == col => SortState::Descending(col.to_string()),
            SortState::Descending(current) if current == col => SortState::Unsorted,
            _ => SortState::Ascending(col.to_string()),
        }
    }

    pub fn column(&self) -> Option<&str> {
        match self {
            SortState::Unsorted => None,
            SortState::Ascending(col) | SortState::Descending(col) => Some(col),
        }
    }

    pub fn direction(&self) -> Option<SortDirection> {
        match self {
            SortState::Unsorted => None,
            SortState::Ascending(_) => Some(SortDirection::Ascending),
            SortState::Descending(_) => Some(SortDirection::Descending),
        }
    }

    /// Direction if `col` is the sorted column
    pub fn direction_of(&self, col: &str) -> Option<SortDirection> {
        if self.column() == Some(col) {
            self.direction()
        } else {
            None
        }
    }

    /// Header suffix for `col`: " ▲", " ▼" or nothing
    pub fn indicator(&self, col: &str) -> &'static str {
        match self.direction_of(col) {
            Some(SortDirection::Ascending) => " ▲",
            Some(SortDirection::Descending) => " ▼",
            None => "",
        }
    }
}

impl fmt::Display for SortState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.column(), self.direction()) {
            (Some(col), Some(dir)) => write!(f, "{} ({})", col, dir.name()),
            _ => write!(f, "unsorted"),
        }
    }
}

/// Order `indices` (rows of `table`) by the sort state.
///
/// Unsorted, or a column the table does not have, keeps the given order. The sort is
/// stable in both directions: rows that compare equal keep their relative order.
pub fn sort_rows(table: &Table, indices: &[usize], state: &SortState) -> Vec<usize> {
    let mut sorted = indices.to_vec();

    let (col, direction) = match (state.column(), state.direction()) {
        (Some(name), Some(direction)) => match table.column_index(name) {
            Some(col) => (col, direction),
            None => return sorted,
        },
        _ => return sorted,
    };

    let rows = table.rows();
    let cmp = |a: usize, b: usize| -> Ordering {
        let base = compare_values(rows[a].get(col), rows[b].get(col));
        match direction {
            SortDirection::Ascending => base,
            SortDirection::Descending => base.reverse(),
        }
    };

    let mut buf = vec![0usize; sorted.len()];
    merge_sort(&mut sorted, &mut buf, &cmp);
    sorted
}

/// Stable merge sort over row indices.
///
/// The value comparator is not transitive across mixed numeric/text columns, so this
/// avoids std's sort, which may panic on an inconsistent order. Halves of large slices
/// are sorted in parallel.
fn merge_sort<F>(items: &mut [usize], buf: &mut [usize], cmp: &F)
where
    F: Fn(usize, usize) -> Ordering + Sync,
{
    let len = items.len();
    if len <= INSERTION_THRESHOLD {
        insertion_sort(items, cmp);
        return;
    }

    let mid = len / 2;
    {
        let (left, right) = items.split_at_mut(mid);
        let (left_buf, right_buf) = buf.split_at_mut(mid);
        if len >= PARALLEL_THRESHOLD {
            rayon::join(
                || merge_sort(left, left_buf, cmp),
                || merge_sort(right, right_buf, cmp),
            );
        } else {
            merge_sort(left, left_buf, cmp);
            merge_sort(right, right_buf, cmp);
        }
    }

    // halves already in order
    if cmp(items[mid - 1], items[mid]) != Ordering::Greater {
        return;
    }

    buf.copy_from_slice(items);
    let (left, right) = buf.split_at(mid);
    let (mut i, mut j, mut k) = (0, 0, 0);

    while i < left.len() && j < right.len() {
        // take from the right only when strictly smaller, which keeps ties stable
        if cmp(right[j], left[i]) == Ordering::Less {
            items[k] = right[j];
            j += 1;
        } else {
            items[k] = left[i];
            i += 1;
        }
        k += 1;
    }

    let rest_left = left.len() - i;
    items[k..k + rest_left].copy_from_slice(&left[i..]);
    k += rest_left;
    items[k..].copy_from_slice(&right[j..]);
}

fn insertion_sort<F>(items: &mut [usize], cmp: &F)
where
    F: Fn(usize, usize) -> Ordering,
{
    for i in 1..items.len() {
        let mut j = i;
        while j > 0 && cmp(items[j - 1], items[j]) == Ordering::Greater {
            items.swap(j - 1, j);
            j -= 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::table::Row;

    fn make_table(headers: &[&str], data: Vec<Vec<&str>>) -> Table {
        Table::new(
            headers.iter().map(|s| s.to_string()).collect(),
            data.into_iter()
                .map(|row| Row::new(row.into_iter().map(|s| s.to_string()).collect()))
                .collect(),
        )
    }

    fn all(table: &Table) -> Vec<usize> {
        (0..table.row_count()).collect()
    }

    #[test]
    fn test_toggle_cycle() {
        let s = SortState::Unsorted;
        let s = s.toggle("age");
        assert_eq!(s, SortState::Ascending("age".to_string()));
        let s = s.toggle("age");
        assert_eq!(s, SortState::Descending("age".to_string()));
        let s = s.toggle("age");
        assert_eq!(s, SortState::Unsorted);
    }

    #[test]
    fn test_toggle_other_column_restarts_ascending() {
        let asc = SortState::Ascending("a".to_string());
        let desc = SortState::Descending("a".to_string());
        assert_eq!(asc.toggle("b"), SortState::Ascending("b".to_string()));
        assert_eq!(desc.toggle("b"), SortState::Ascending("b".to_string()));
    }

    #[test]
    fn test_indicator() {
        let s = SortState::Ascending("a".to_string());
        assert_eq!(s.indicator("a"), " ▲");
        assert_eq!(s.indicator("b"), "");
        assert_eq!(s.toggle("a").indicator("a"), " ▼");
        assert_eq!(SortState::Unsorted.indicator("a"), "");
    }

    #[test]
    fn test_display() {
        assert_eq!(SortState::Descending("age".to_string()).to_string(), "age (descending)");
        assert_eq!(SortState::Unsorted.to_string(), "unsorted");
    }

    #[test]
    fn test_sort_numeric_ascending_descending() {
        let table = make_table(&["n"], vec![vec!["10"], vec!["9"], vec!["100"], vec!["-1"]]);

        let asc = sort_rows(&table, &all(&table), &SortState::Ascending("n".to_string()));
        assert_eq!(asc, vec![3, 1, 0, 2]);

        let desc = sort_rows(&table, &all(&table), &SortState::Descending("n".to_string()));
        assert_eq!(desc, vec![2, 0, 1, 3]);
    }

    #[test]
    fn test_sort_is_stable_in_both_directions() {
        let table = make_table(
            &["k", "id"],
            vec![vec!["b", "0"], vec!["a", "1"], vec!["b", "2"], vec!["a", "3"], vec!["b", "4"]],
        );

        let asc = sort_rows(&table, &all(&table), &SortState::Ascending("k".to_string()));
        assert_eq!(asc, vec![1, 3, 0, 2, 4]);

        let desc = sort_rows(&table, &all(&table), &SortState::Descending("k".to_string()));
        assert_eq!(desc, vec![0, 2, 4, 1, 3]);
    }

    #[test]
    fn test_unsorted_and_unknown_column_keep_order() {
        let table = make_table(&["k"], vec![vec!["c"], vec!["a"], vec!["b"]]);
        let input = vec![2, 0, 1];

        assert_eq!(sort_rows(&table, &input, &SortState::Unsorted), input);
        assert_eq!(sort_rows(&table, &input, &SortState::Ascending("nope".to_string())), input);
    }

    #[test]
    fn test_sort_subset_only() {
        let table = make_table(&["k"], vec![vec!["c"], vec!["a"], vec!["b"], vec!["d"]]);
        let sorted = sort_rows(&table, &[3, 0, 2], &SortState::Ascending("k".to_string()));
        assert_eq!(sorted, vec![2, 0, 3]);
    }

    #[test]
    fn test_mixed_column_does_not_panic() {
        let table = make_table(
            &["v"],
            vec![vec!["1e3"], vec!["200"], vec!["1f"], vec![""], vec!["abc"], vec!["7"]],
        );
        let sorted = sort_rows(&table, &all(&table), &SortState::Ascending("v".to_string()));
        let mut seen = sorted.clone();
        seen.sort();
        assert_eq!(seen, all(&table));
    }

    #[test]
    fn test_large_sort_matches_std_stable_sort() {
        let count = PARALLEL_THRESHOLD * 2 + 37;
        let data: Vec<Vec<String>> = (0..count)
            .map(|i| vec![((i * 7919) % 1000).to_string(), i.to_string()])
            .collect();
        let table = Table::new(
            vec!["k".to_string(), "id".to_string()],
            data.into_iter().map(Row::new).collect(),
        );

        let sorted = sort_rows(&table, &all(&table), &SortState::Ascending("k".to_string()));

        let mut expected = all(&table);
        expected.sort_by_key(|&i| table.rows()[i].get(0).parse::<u64>().unwrap_or(0));
        assert_eq!(sorted, expected);
    }
}
