use std::collections::{HashMap, HashSet};

/// One record of a loaded table.
///
/// Values are stored positionally, aligned with the owning table's headers. A value
/// that is missing (short row) reads as the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    values: Vec<String>,
}

impl Row {
    pub fn new(values: Vec<String>) -> Self {
        Self { values }
    }

    /// Value at a column index, or "" when the row has no such field
    #[inline]
    pub fn get(&self, col: usize) -> &str {
        self.values.get(col).map(String::as_str).unwrap_or("")
    }

    #[cfg(test)]
    pub fn values(&self) -> &[String] {
        &self.values
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.values.len()
    }
}

impl From<Vec<String>> for Row {
    fn from(values: Vec<String>) -> Self {
        Self::new(values)
    }
}

/// Immutable table: ordered headers plus ordered rows.
///
/// Created once per successful parse and replaced wholesale on reload.
#[derive(Debug, Clone, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Row>,
    /// Header name -> column index
    header_index: HashMap<String, usize>,
}

impl Table {
    /// Build a table. Headers are expected to be unique (see [`dedup_headers`]);
    /// if a name repeats, lookups by name resolve to its first occurrence.
    pub fn new(headers: Vec<String>, rows: Vec<Row>) -> Self {
        let mut header_index = HashMap::with_capacity(headers.len());
        for (idx, name) in headers.iter().enumerate() {
            header_index.entry(name.clone()).or_insert(idx);
        }

        Self { headers, rows, header_index }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    #[cfg(test)]
    pub fn row(&self, idx: usize) -> Option<&Row> {
        self.rows.get(idx)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn col_count(&self) -> usize {
        self.headers.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.header_index.get(name).copied()
    }

    /// Value of a row under a header name; unknown rows or columns read as ""
    #[cfg(test)]
    pub fn value(&self, row: usize, col: &str) -> &str {
        match (self.rows.get(row), self.column_index(col)) {
            (Some(r), Some(c)) => r.get(c),
            _ => "",
        }
    }
}

/// Make header names unique by suffixing repeats with `_1`, `_2`, ...
///
/// Returns the new header list and the (original, renamed) pairs.
pub fn dedup_headers(headers: Vec<String>) -> (Vec<String>, Vec<(String, String)>) {
    let mut seen: HashSet<String> = HashSet::with_capacity(headers.len());
    let mut renamed = Vec::new();
    let mut out = Vec::with_capacity(headers.len());

    for name in headers {
        if seen.insert(name.clone()) {
            out.push(name);
            continue;
        }

        let mut n = 1;
        let mut candidate = format!("{}_{}", name, n);
        while seen.contains(&candidate) {
            n += 1;
            candidate = format!("{}_{}", name, n);
        }
        seen.insert(candidate.clone());
        renamed.push((name, candidate.clone()));
        out.push(candidate);
    }

    (out, renamed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_row_missing_value_is_empty() {
        let row = Row::new(strings(&["a"]));
        assert_eq!(row.get(0), "a");
        assert_eq!(row.get(1), "");
        assert_eq!(row.get(100), "");
    }

    #[test]
    fn test_value_by_name() {
        let table = Table::new(
            strings(&["name", "age"]),
            vec![Row::new(strings(&["Bob", "30"])), Row::new(strings(&["Amy"]))],
        );

        assert_eq!(table.value(0, "age"), "30");
        assert_eq!(table.value(1, "age"), "");
        assert_eq!(table.value(0, "missing"), "");
        assert_eq!(table.value(9, "name"), "");
        assert_eq!(table.column_index("age"), Some(1));
    }

    #[test]
    fn test_dedup_headers() {
        let (headers, renamed) = dedup_headers(strings(&["a", "b", "a", "a_1", "a"]));
        assert_eq!(headers, strings(&["a", "b", "a_1", "a_1_1", "a_2"]));
        assert_eq!(renamed.len(), 3);
        assert_eq!(renamed[0], ("a".to_string(), "a_1".to_string()));
    }

    #[test]
    fn test_dedup_headers_unique_untouched() {
        let (headers, renamed) = dedup_headers(strings(&["x", "y", "z"]));
        assert_eq!(headers, strings(&["x", "y", "z"]));
        assert!(renamed.is_empty());
    }
}
