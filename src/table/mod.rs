use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

static WHITESPACE_RUN: OnceLock<Regex> = OnceLock::new();

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TableError {
    #[error("column index {index} is out of range for a table with {columns} columns")]
    InvalidColumnIndex { index: usize, columns: usize },
}

/// Collapses line breaks and whitespace runs into single spaces and trims the ends.
pub fn normalize_text(raw: &str) -> String {
    let re = WHITESPACE_RUN.get_or_init(|| Regex::new(r"\s+").expect("static whitespace pattern"));
    re.replace_all(raw, " ").trim().to_string()
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Cell {
    pub text: String,
    /// Pre-parsed numeric value; when set the sorter uses it instead of parsing `text`.
    pub sort_hint: Option<f64>,
}

impl Cell {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sort_hint: None,
        }
    }

    pub fn with_hint(text: impl Into<String>, hint: f64) -> Self {
        Self {
            text: text.into(),
            sort_hint: Some(hint),
        }
    }

    pub fn normalized(&self) -> String {
        normalize_text(&self.text)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::new(value)
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::new(value)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Row {
    pub cells: Vec<Cell>,
}

impl Row {
    pub fn new(cells: Vec<Cell>) -> Self {
        Self { cells }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Missing cells in a ragged row read as empty text.
    pub fn text_at(&self, column: usize) -> &str {
        self.cells.get(column).map(|c| c.text.as_str()).unwrap_or("")
    }

    pub fn cell_at(&self, column: usize) -> Option<&Cell> {
        self.cells.get(column)
    }
}

impl<T: Into<Cell>> FromIterator<T> for Row {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Row::new(iter.into_iter().map(Into::into).collect())
    }
}

/// Immutable snapshot of a rendered table.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    pub rows: Vec<Row>,
    /// Width declared by the header, if the source table had one.
    pub columns: Option<usize>,
}

impl Table {
    pub fn new(rows: Vec<Row>) -> Self {
        Self {
            rows,
            columns: None,
        }
    }

    pub fn with_columns(rows: Vec<Row>, columns: usize) -> Self {
        Self {
            rows,
            columns: Some(columns),
        }
    }

    pub fn from_texts<R, C, S>(rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let rows = rows
            .into_iter()
            .map(|r| r.into_iter().map(|s| Cell::new(s.into())).collect::<Row>())
            .collect();
        Self::new(rows)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_count(&self) -> usize {
        self.columns
            .unwrap_or_else(|| self.rows.iter().map(Row::len).max().unwrap_or(0))
    }

    pub fn check_column(&self, index: usize) -> Result<(), TableError> {
        let columns = self.column_count();
        if index >= columns {
            return Err(TableError::InvalidColumnIndex { index, columns });
        }
        Ok(())
    }

    /// Normalized text of every cell, padded to the column count.
    pub fn normalized_texts(&self) -> Vec<Vec<String>> {
        let width = self.column_count();
        self.rows
            .iter()
            .map(|row| {
                (0..width.max(row.len()))
                    .map(|c| normalize_text(row.text_at(c)))
                    .collect()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_newlines_and_whitespace() {
        assert_eq!(normalize_text("  a\n b\t\tc \r\n d  "), "a b c d");
        assert_eq!(normalize_text("\n\n"), "");
        assert_eq!(normalize_text("e\nf"), "e f");
    }

    #[test]
    fn ragged_rows_read_as_empty() {
        let table = Table::from_texts(vec![vec!["a", "b", "c"], vec!["d"]]);
        assert_eq!(table.column_count(), 3);
        assert_eq!(table.rows[1].text_at(2), "");
        assert_eq!(table.normalized_texts()[1], vec!["d", "", ""]);
    }

    #[test]
    fn declared_header_width_wins() {
        let table = Table::with_columns(vec![Row::from_iter(["x"])], 4);
        assert_eq!(table.column_count(), 4);
        assert!(table.check_column(3).is_ok());
        assert_eq!(
            table.check_column(4),
            Err(TableError::InvalidColumnIndex {
                index: 4,
                columns: 4
            })
        );
    }

    #[test]
    fn empty_table_rejects_every_column() {
        let table = Table::default();
        assert!(table.check_column(0).is_err());
    }
}
