//! In-memory row-oriented table.
//!
//! A [`Table`] is rectangular: every row holds exactly one [`Cell`] per
//! column. Row identity is the ordinal index, which is stable from load to
//! output.

use crate::cell::Cell;

/// Column-named, row-oriented table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Create an empty table with the given header.
    #[must_use]
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row, padding or truncating it to the header width.
    pub fn push_row(&mut self, mut cells: Vec<Cell>) {
        cells.resize(self.columns.len(), Cell::Absent);
        self.rows.push(cells);
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by exact name.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Rename `from` to `to`. Returns `false` when `from` does not exist.
    pub fn rename_column(&mut self, from: &str, to: &str) -> bool {
        match self.column_index(from) {
            Some(idx) => {
                self.columns[idx] = to.to_string();
                true
            }
            None => false,
        }
    }

    /// Make sure `name` exists, synthesizing an all-absent column if needed.
    pub fn ensure_column(&mut self, name: &str) -> usize {
        if let Some(idx) = self.column_index(name) {
            return idx;
        }
        self.columns.push(name.to_string());
        for row in &mut self.rows {
            row.push(Cell::Absent);
        }
        self.columns.len() - 1
    }

    /// Borrowed view of row `idx`.
    #[must_use]
    pub fn row(&self, idx: usize) -> Option<RowRef<'_>> {
        self.rows.get(idx).map(|cells| RowRef {
            index: idx,
            columns: &self.columns,
            cells,
        })
    }

    /// Iterate rows in input order.
    pub fn iter_rows(&self) -> impl Iterator<Item = RowRef<'_>> {
        self.rows.iter().enumerate().map(|(index, cells)| RowRef {
            index,
            columns: &self.columns,
            cells,
        })
    }

    /// Mutable access to every cell of every row, for in-place rewrites.
    pub fn cells_mut(&mut self) -> impl Iterator<Item = &mut Cell> {
        self.rows.iter_mut().flat_map(|row| row.iter_mut())
    }

    /// Append `columns` to the header and `values[i]` to row `i`.
    ///
    /// `values` must hold exactly one entry per row; rows without a
    /// corresponding entry are padded with absent cells.
    pub fn append_columns(&mut self, columns: &[String], values: Vec<Vec<Cell>>) {
        let width = columns.len();
        self.columns.extend(columns.iter().cloned());
        let mut values = values.into_iter();
        for row in &mut self.rows {
            let mut extra = values.next().unwrap_or_default();
            extra.resize(width, Cell::Absent);
            row.extend(extra);
        }
    }

    /// Keep only the first `n` rows.
    pub fn truncate(&mut self, n: usize) {
        self.rows.truncate(n);
    }

    /// Rows as raw cell slices.
    pub fn raw_rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.rows.iter().map(Vec::as_slice)
    }
}

/// Borrowed view of one table row.
#[derive(Debug, Clone, Copy)]
pub struct RowRef<'a> {
    index: usize,
    columns: &'a [String],
    cells: &'a [Cell],
}

impl<'a> RowRef<'a> {
    /// Ordinal position of the row in its table.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Cell for `column`, or `None` when the column is not present at all.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&'a Cell> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|idx| &self.cells[idx])
    }

    /// Trimmed text for `column`; missing columns and absent cells are `None`.
    #[must_use]
    pub fn text(&self, column: &str) -> Option<String> {
        self.get(column)
            .and_then(Cell::text)
            .map(std::borrow::Cow::into_owned)
    }

    #[must_use]
    pub fn cells(&self) -> &'a [Cell] {
        self.cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        let mut table = Table::new(vec!["TEXT".into(), "YEAR".into()]);
        table.push_row(vec![Cell::from("steel"), Cell::from("2021")]);
        table.push_row(vec![Cell::Absent]);
        table
    }

    #[test]
    fn short_rows_are_padded() {
        let table = sample();
        let row = table.row(1).unwrap();
        assert_eq!(row.cells().len(), 2);
        assert!(row.get("YEAR").unwrap().is_absent());
    }

    #[test]
    fn ensure_column_synthesizes_absent_cells() {
        let mut table = sample();
        let idx = table.ensure_column("region");
        assert_eq!(idx, 2);
        assert!(table.iter_rows().all(|r| r.get("region") == Some(&Cell::Absent)));
        assert_eq!(table.ensure_column("region"), 2);
    }

    #[test]
    fn rename_unknown_column_is_noop() {
        let mut table = sample();
        assert!(!table.rename_column("MISSING", "missing"));
        assert!(table.rename_column("TEXT", "text"));
        assert_eq!(table.row(0).unwrap().text("text").as_deref(), Some("steel"));
    }

    #[test]
    fn append_columns_keeps_row_alignment() {
        let mut table = sample();
        table.append_columns(
            &["out".to_string()],
            vec![vec![Cell::from("a")], vec![Cell::from("b")]],
        );
        assert_eq!(table.row(0).unwrap().text("out").as_deref(), Some("a"));
        assert_eq!(table.row(1).unwrap().text("out").as_deref(), Some("b"));
    }
}
