pub mod collate;

use std::cmp::Ordering;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::table::{normalize_text, Cell, Table, TableError};

pub use collate::locale_compare;

static NON_NUMERIC: OnceLock<Regex> = OnceLock::new();
static NUMERIC_PREFIX: OnceLock<Regex> = OnceLock::new();

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn from_ascending(ascending: bool) -> Self {
        if ascending {
            Self::Ascending
        } else {
            Self::Descending
        }
    }

    pub fn is_ascending(self) -> bool {
        self == Self::Ascending
    }

    pub fn css_class(self) -> &'static str {
        match self {
            SortDirection::Ascending => "sorting-asc",
            SortDirection::Descending => "sorting-desc",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SortOutcome {
    pub table: Table,
    pub column: usize,
    pub direction: SortDirection,
}

/// Parses the numeric prefix of `text` after dropping everything except digits, `.` and `-`.
///
/// Mirrors `parseFloat`: `"1.2.3"` reads as 1.2, `"-"` and `""` are not numbers.
pub fn numeric_value(text: &str) -> Option<f64> {
    let strip = NON_NUMERIC.get_or_init(|| Regex::new(r"[^\d.-]").expect("static strip pattern"));
    let prefix = NUMERIC_PREFIX
        .get_or_init(|| Regex::new(r"^-?(?:\d+(?:\.\d*)?|\.\d+)").expect("static number pattern"));
    let stripped = strip.replace_all(text, "");
    let m = prefix.find(&stripped)?;
    m.as_str().parse::<f64>().ok()
}

fn cell_number(cell: Option<&Cell>, text: &str) -> Option<f64> {
    match cell.and_then(|c| c.sort_hint) {
        Some(hint) if !hint.is_nan() => Some(hint),
        _ => numeric_value(text),
    }
}

/// Pairwise comparison: numeric when both sides parse, lexical otherwise.
///
/// A column mixing numbers and words is not partitioned; each pair picks its own path.
pub fn compare_cells(a: (&str, Option<f64>), b: (&str, Option<f64>)) -> Ordering {
    match (a.1, b.1) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => locale_compare(a.0, b.0),
    }
}

/// Stable top-down merge sort that accepts comparators which are not a total order.
///
/// `compare_cells` is not transitive on mixed columns. Any comparator yields a permutation here,
/// and items that compare equal never swap.
fn merge_sort_by<T, F>(items: Vec<T>, cmp: &mut F) -> Vec<T>
where
    F: FnMut(&T, &T) -> Ordering,
{
    if items.len() <= 1 {
        return items;
    }
    let mut left = items;
    let right = left.split_off(left.len() / 2);
    let left = merge_sort_by(left, cmp);
    let right = merge_sort_by(right, cmp);

    let mut merged = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();
    loop {
        let take_right = match (left.peek(), right.peek()) {
            (Some(l), Some(r)) => cmp(l, r) == Ordering::Greater,
            (Some(_), None) => false,
            (None, Some(_)) => true,
            (None, None) => break,
        };
        merged.extend(if take_right { right.next() } else { left.next() });
    }
    merged
}

// Normalized text, parsed number, original row index.
type SortKey = (String, Option<f64>, usize);

/// Returns a reordered copy of `table` sorted on `column`. Ties keep their relative order.
pub fn sort(table: &Table, column: usize, direction: SortDirection) -> Result<SortOutcome, TableError> {
    table.check_column(column)?;

    let keyed: Vec<SortKey> = table
        .rows
        .iter()
        .enumerate()
        .map(|(idx, row)| {
            let text = normalize_text(row.text_at(column));
            let number = cell_number(row.cell_at(column), &text);
            (text, number, idx)
        })
        .collect();

    let keyed = merge_sort_by(keyed, &mut |a: &SortKey, b: &SortKey| {
        let ord = compare_cells((&a.0, a.1), (&b.0, b.1));
        match direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    });

    let rows = keyed
        .into_iter()
        .map(|(_, _, idx)| table.rows[idx].clone())
        .collect();

    tracing::debug!(column, ?direction, rows = table.row_count(), "sorted table");
    Ok(SortOutcome {
        table: Table {
            rows,
            columns: table.columns,
        },
        column,
        direction,
    })
}

/// Header sort markers; at most one column is marked at a time.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SortIndicators {
    headers: Vec<Option<SortDirection>>,
}

impl SortIndicators {
    pub fn new(columns: usize) -> Self {
        Self {
            headers: vec![None; columns],
        }
    }

    pub fn apply(&mut self, column: usize, direction: SortDirection) -> Result<(), TableError> {
        if column >= self.headers.len() {
            return Err(TableError::InvalidColumnIndex {
                index: column,
                columns: self.headers.len(),
            });
        }
        self.headers.iter_mut().for_each(|h| *h = None);
        self.headers[column] = Some(direction);
        Ok(())
    }

    pub fn apply_outcome(&mut self, outcome: &SortOutcome) -> Result<(), TableError> {
        self.apply(outcome.column, outcome.direction)
    }

    pub fn active(&self) -> Option<(usize, SortDirection)> {
        self.headers
            .iter()
            .enumerate()
            .find_map(|(idx, h)| h.map(|d| (idx, d)))
    }

    pub fn class_for(&self, column: usize) -> Option<&'static str> {
        self.headers
            .get(column)
            .copied()
            .flatten()
            .map(SortDirection::css_class)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Row;

    fn fruit() -> Table {
        Table::from_texts(vec![
            vec!["Banana", "3"],
            vec!["Apple", "10"],
            vec!["Cherry", "2"],
        ])
    }

    fn first_column(table: &Table) -> Vec<String> {
        table.rows.iter().map(|r| r.text_at(0).to_string()).collect()
    }

    #[test]
    fn numeric_column_sorts_by_value() {
        let out = sort(&fruit(), 1, SortDirection::Ascending).unwrap();
        assert_eq!(first_column(&out.table), vec!["Cherry", "Banana", "Apple"]);
        assert_eq!(out.column, 1);
        assert_eq!(out.direction, SortDirection::Ascending);
    }

    #[test]
    fn text_column_sorts_lexically() {
        let out = sort(&fruit(), 0, SortDirection::Descending).unwrap();
        assert_eq!(first_column(&out.table), vec!["Cherry", "Banana", "Apple"]);
    }

    #[test]
    fn numeric_value_follows_parse_float_prefix_rules() {
        assert_eq!(numeric_value("1,024 KB"), Some(1024.0));
        assert_eq!(numeric_value("v1.2.3"), Some(1.2));
        assert_eq!(numeric_value("-15 ms"), Some(-15.0));
        assert_eq!(numeric_value(".5"), Some(0.5));
        assert_eq!(numeric_value("-"), None);
        assert_eq!(numeric_value(""), None);
        assert_eq!(numeric_value("error"), None);
        assert_eq!(numeric_value("--3"), None);
    }

    #[test]
    fn direction_reverses_homogeneous_columns() {
        let table = Table::from_texts(vec![vec!["5"], vec!["1"], vec!["30"], vec!["-2"]]);
        let asc = sort(&table, 0, SortDirection::Ascending).unwrap();
        let desc = sort(&asc.table, 0, SortDirection::Descending).unwrap();
        let mut reversed = asc.table.rows.clone();
        reversed.reverse();
        assert_eq!(desc.table.rows, reversed);
    }

    #[test]
    fn sorting_is_idempotent() {
        let once = sort(&fruit(), 0, SortDirection::Ascending).unwrap();
        let twice = sort(&once.table, 0, SortDirection::Ascending).unwrap();
        assert_eq!(once.table, twice.table);
    }

    #[test]
    fn equal_keys_keep_their_order_in_both_directions() {
        let table = Table::from_texts(vec![
            vec!["warn", "a"],
            vec!["info", "b"],
            vec!["warn", "c"],
            vec!["info", "d"],
        ]);
        let asc = sort(&table, 0, SortDirection::Ascending).unwrap();
        let tags: Vec<&str> = asc.table.rows.iter().map(|r| r.text_at(1)).collect();
        assert_eq!(tags, vec!["b", "d", "a", "c"]);
        let desc = sort(&table, 0, SortDirection::Descending).unwrap();
        let tags: Vec<&str> = desc.table.rows.iter().map(|r| r.text_at(1)).collect();
        assert_eq!(tags, vec!["a", "c", "b", "d"]);
    }

    #[test]
    fn empty_text_sorts_first_ascending() {
        let table = Table::from_texts(vec![vec!["b"], vec![""], vec!["a"]]);
        let out = sort(&table, 0, SortDirection::Ascending).unwrap();
        assert_eq!(first_column(&out.table), vec!["", "a", "b"]);
    }

    #[test]
    fn mixed_pairs_fall_back_to_lexical() {
        assert_eq!(
            compare_cells(("10", Some(10.0)), ("9", Some(9.0))),
            Ordering::Greater
        );
        assert_eq!(compare_cells(("10", Some(10.0)), ("n/a", None)), Ordering::Less);
        assert_eq!(compare_cells(("10", Some(10.0)), ("9", None)), Ordering::Less);
    }

    const MIXED: [&str; 16] = [
        "10", "9", "n/a", "2", "abc", "100", "1x", "x1", "-", "", "5 KB", "zz", "3", "b2", "07",
        "a10",
    ];

    fn mixed_column(rows: usize) -> Table {
        Table::from_texts(
            (0..rows)
                .map(|i| vec![MIXED[(i * 7 + 3) % MIXED.len()].to_string(), i.to_string()])
                .collect::<Vec<_>>(),
        )
    }

    #[test]
    fn large_mixed_column_sorts_in_both_directions() {
        let table = mixed_column(64);
        for direction in [SortDirection::Ascending, SortDirection::Descending] {
            let out = sort(&table, 0, direction).unwrap();
            assert_eq!(out.table.row_count(), 64);

            let mut seen: Vec<usize> = out
                .table
                .rows
                .iter()
                .map(|r| r.text_at(1).parse().unwrap())
                .collect();
            seen.sort_unstable();
            assert_eq!(seen, (0..64).collect::<Vec<_>>());

            for value in MIXED {
                let order: Vec<usize> = out
                    .table
                    .rows
                    .iter()
                    .filter(|r| r.text_at(0) == value)
                    .map(|r| r.text_at(1).parse().unwrap())
                    .collect();
                assert_eq!(order.len(), 4, "{value:?}");
                assert!(order.windows(2).all(|w| w[0] < w[1]), "{value:?} {order:?}");
            }
        }
    }

    #[test]
    fn large_numeric_column_matches_value_order() {
        let table = Table::from_texts(
            (0..48)
                .map(|i| vec![format!("{} KB", (i * 37) % 101)])
                .collect::<Vec<_>>(),
        );
        let out = sort(&table, 0, SortDirection::Descending).unwrap();
        let values: Vec<f64> = out
            .table
            .rows
            .iter()
            .filter_map(|r| numeric_value(r.text_at(0)))
            .collect();
        assert_eq!(values.len(), 48);
        assert!(values.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn merge_tolerates_inconsistent_comparator() {
        let items: Vec<u32> = (0..100).collect();
        let mut flip = 0u32;
        let out = merge_sort_by(items, &mut |_, _| {
            flip += 1;
            if flip % 3 == 0 {
                Ordering::Greater
            } else {
                Ordering::Less
            }
        });
        let mut sorted = out.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn sort_hint_overrides_text() {
        let table = Table::new(vec![
            Row::new(vec![Cell::with_hint("yesterday", 1.0)]),
            Row::new(vec![Cell::with_hint("today", 2.0)]),
            Row::new(vec![Cell::with_hint("last week", 0.0)]),
        ]);
        let out = sort(&table, 0, SortDirection::Ascending).unwrap();
        assert_eq!(first_column(&out.table), vec!["last week", "yesterday", "today"]);
    }

    #[test]
    fn out_of_range_column_is_an_error() {
        let err = sort(&fruit(), 2, SortDirection::Ascending).unwrap_err();
        assert_eq!(err, TableError::InvalidColumnIndex { index: 2, columns: 2 });
    }

    #[test]
    fn indicators_mark_exactly_one_column() {
        let mut ind = SortIndicators::new(3);
        ind.apply(0, SortDirection::Ascending).unwrap();
        ind.apply(2, SortDirection::Descending).unwrap();
        assert_eq!(ind.active(), Some((2, SortDirection::Descending)));
        assert_eq!(ind.class_for(0), None);
        assert_eq!(ind.class_for(2), Some("sorting-desc"));
        assert!(ind.apply(3, SortDirection::Ascending).is_err());
        assert_eq!(ind.active(), Some((2, SortDirection::Descending)));
    }
}
