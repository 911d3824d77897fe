pub mod sink;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::table::Table;

pub use sink::{DirectorySink, DownloadSink, MemorySink};

pub const UTF8_BOM: &str = "\u{FEFF}";
pub const CSV_MIME: &str = "text/csv;charset=utf-8;";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("no table found to export")]
    NoTableFound,

    #[error("invalid export filename: {filename}")]
    InvalidFilename { filename: String },

    #[error("failed to write export file: {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// How double quotes inside a cell are written.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuotePolicy {
    /// Embedded quotes are doubled (`"` -> `""`).
    #[default]
    Doubled,
    /// Embedded quotes are written as is, matching the page's legacy export.
    Verbatim,
}

impl QuotePolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "doubled" | "rfc4180" | "escape" => Some(Self::Doubled),
            "verbatim" | "legacy" | "raw" => Some(Self::Verbatim),
            _ => None,
        }
    }

    fn quote(self, text: &str) -> String {
        match self {
            QuotePolicy::Doubled => format!("\"{}\"", text.replace('"', "\"\"")),
            QuotePolicy::Verbatim => format!("\"{text}\""),
        }
    }
}

/// Renders every row as one line of quote-wrapped, comma-separated fields.
///
/// Header rows are not treated specially, so the output keeps the visual order
/// of the source table. Ragged rows are padded with empty fields.
pub fn serialize(table: &Table, policy: QuotePolicy) -> String {
    table
        .normalized_texts()
        .iter()
        .map(|row| row.iter().map(|text| policy.quote(text)).join(","))
        .join("\n")
}

/// Serializes the table, prefixes the UTF-8 BOM and hands the bytes to `sink`.
pub fn export_to_file(
    table: Option<&Table>,
    filename: &str,
    policy: QuotePolicy,
    sink: &dyn DownloadSink,
) -> Result<(), ExportError> {
    let table = match table {
        Some(t) if !t.is_empty() => t,
        _ => return Err(ExportError::NoTableFound),
    };
    let mut csv = String::from(UTF8_BOM);
    csv.push_str(&serialize(table, policy));
    tracing::debug!(
        rows = table.row_count(),
        filename,
        bytes = csv.len(),
        "exporting table"
    );
    sink.save(csv.as_bytes(), filename, CSV_MIME)
}

/// Splits a document produced by [`serialize`] back into field texts.
///
/// Only understands quote-wrapped fields; a leading BOM is ignored.
pub fn parse_quoted_csv(text: &str) -> Vec<Vec<String>> {
    let text = text.strip_prefix(UTF8_BOM).unwrap_or(text);
    if text.is_empty() {
        return Vec::new();
    }

    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else if matches!(chars.peek(), None | Some(',') | Some('\n')) {
                    in_quotes = false;
                } else {
                    field.push('"');
                }
            }
            '"' if field.is_empty() => in_quotes = true,
            ',' if !in_quotes => row.push(std::mem::take(&mut field)),
            '\n' if !in_quotes => {
                row.push(std::mem::take(&mut field));
                rows.push(std::mem::take(&mut row));
            }
            other => field.push(other),
        }
    }
    row.push(field);
    rows.push(row);
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{Cell, Row};

    #[test]
    fn serializes_rows_as_quoted_lines() {
        let table = Table::from_texts(vec![vec!["a", "b"], vec!["c,d", "e\nf"]]);
        assert_eq!(
            serialize(&table, QuotePolicy::Verbatim),
            "\"a\",\"b\"\n\"c,d\",\"e f\""
        );
    }

    #[test]
    fn doubled_policy_escapes_embedded_quotes() {
        let table = Table::from_texts(vec![vec![r#"say "hi""#]]);
        assert_eq!(serialize(&table, QuotePolicy::Doubled), r#""say ""hi""""#);
        assert_eq!(serialize(&table, QuotePolicy::Verbatim), r#""say "hi"""#);
    }

    #[test]
    fn every_line_has_the_column_count() {
        let table = Table::with_columns(
            vec![
                Row::from_iter(["h1", "h2", "h3"]),
                Row::from_iter(["1"]),
                Row::new(vec![Cell::new("x"), Cell::new(" y "), Cell::new("z")]),
            ],
            3,
        );
        let csv = serialize(&table, QuotePolicy::Doubled);
        let lines: Vec<&str> = csv.split('\n').collect();
        assert_eq!(lines.len(), 3);
        for line in lines {
            assert_eq!(line.matches("\",\"").count(), 2);
        }
        assert!(csv.ends_with("\"x\",\"y\",\"z\""));
    }

    #[test]
    fn round_trips_normalized_texts() {
        let table = Table::from_texts(vec![
            vec!["Host", "Message"],
            vec!["srv-01", "disk \"full\", retry\nlater"],
            vec!["", "  spaced   out "],
        ]);
        let parsed = parse_quoted_csv(&serialize(&table, QuotePolicy::Doubled));
        assert_eq!(parsed, table.normalized_texts());
    }

    #[test]
    fn export_prefixes_bom_and_uses_csv_mime() {
        let sink = MemorySink::default();
        let table = Table::from_texts(vec![vec!["a"]]);
        export_to_file(Some(&table), "logs.csv", QuotePolicy::Doubled, &sink).unwrap();
        let saved = sink.saved();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].filename, "logs.csv");
        assert_eq!(saved[0].mime, CSV_MIME);
        assert_eq!(&saved[0].bytes[..3], &[0xEF, 0xBB, 0xBF]);
        assert_eq!(&saved[0].bytes[3..], b"\"a\"");
    }

    #[test]
    fn export_without_rows_is_no_table_found() {
        let sink = MemorySink::default();
        let empty = Table::default();
        assert!(matches!(
            export_to_file(Some(&empty), "x.csv", QuotePolicy::Doubled, &sink),
            Err(ExportError::NoTableFound)
        ));
        assert!(matches!(
            export_to_file(None, "x.csv", QuotePolicy::Doubled, &sink),
            Err(ExportError::NoTableFound)
        ));
        assert!(sink.saved().is_empty());
    }

    #[test]
    fn quote_policy_parses_aliases() {
        assert_eq!(QuotePolicy::parse("Legacy"), Some(QuotePolicy::Verbatim));
        assert_eq!(QuotePolicy::parse("rfc4180"), Some(QuotePolicy::Doubled));
        assert_eq!(QuotePolicy::parse("tsv"), None);
    }
}
