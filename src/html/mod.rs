//! Reads table and form snapshots out of a rendered page.

use scraper::{node::Node, ElementRef, Html, Selector};
use thiserror::Error;

use crate::table::{Cell, Row, Table};
use crate::validate::{FieldKind, FormField};

#[derive(Debug, Error)]
pub enum HtmlError {
    #[error("invalid selector: {selector}")]
    InvalidSelector { selector: String },

    #[error("failed to read page {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

fn selector(raw: &str) -> Result<Selector, HtmlError> {
    Selector::parse(raw).map_err(|_| HtmlError::InvalidSelector {
        selector: raw.to_string(),
    })
}

/// Rendered text of an element, with `<br>` read as a line break.
pub fn element_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    for node in element.descendants() {
        match node.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) if el.name() == "br" => out.push('\n'),
            _ => {}
        }
    }
    out
}

fn row_of(tr: ElementRef<'_>, cells: &Selector) -> Row {
    tr.select(cells)
        .map(|cell| {
            let text = element_text(cell);
            match cell
                .value()
                .attr("data-sort-value")
                .and_then(|v| v.trim().parse::<f64>().ok())
            {
                Some(hint) => Cell::with_hint(text, hint),
                None => Cell::new(text),
            }
        })
        .collect()
}

/// Snapshot of one `<table>`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableSnapshot {
    pub id: Option<String>,
    /// Every row in document order, header included; this is what gets exported.
    pub all_rows: Table,
    /// Header cell texts (`thead th`, or the first row's `th` cells).
    pub headers: Vec<String>,
    /// Body rows only; this is what gets sorted.
    pub body: Table,
}

pub struct Page {
    document: Html,
}

impl Page {
    pub fn parse(html: &str) -> Self {
        Self {
            document: Html::parse_document(html),
        }
    }

    pub fn load(path: &str) -> Result<Self, HtmlError> {
        let raw = std::fs::read_to_string(path).map_err(|e| HtmlError::Read {
            path: path.to_string(),
            source: e,
        })?;
        Ok(Self::parse(&raw))
    }

    pub fn document(&self) -> &Html {
        &self.document
    }

    pub fn select_all(&self, raw: &str) -> Result<Vec<ElementRef<'_>>, HtmlError> {
        let sel = selector(raw)?;
        Ok(self.document.select(&sel).collect())
    }

    pub fn first(&self, raw: &str) -> Result<Option<ElementRef<'_>>, HtmlError> {
        let sel = selector(raw)?;
        Ok(self.document.select(&sel).next())
    }

    pub fn by_id(&self, id: &str) -> Option<ElementRef<'_>> {
        let sel = selector("[id]").ok()?;
        self.document
            .select(&sel)
            .find(|el| el.value().attr("id") == Some(id))
    }

    /// Locates a table by id, or the first table on the page.
    pub fn table(&self, id: Option<&str>) -> Result<Option<TableSnapshot>, HtmlError> {
        let table = match id {
            Some(id) => self.by_id(id).filter(|el| el.value().name() == "table"),
            None => self.first("table")?,
        };
        let Some(table) = table else {
            return Ok(None);
        };

        let tr = selector("tr")?;
        let cells = selector("td, th")?;
        let head_cells = selector("thead th")?;
        let body_rows = selector("tbody tr")?;
        let th = selector("th")?;
        let td = selector("td")?;

        let rows: Vec<Row> = table.select(&tr).map(|r| row_of(r, &cells)).collect();

        let mut headers: Vec<String> = table.select(&head_cells).map(element_text).collect();
        if headers.is_empty() {
            if let Some(first) = table.select(&tr).next() {
                headers = first.select(&th).map(element_text).collect();
            }
        }

        // Parsers insert an implicit tbody, so header-only rows can land in it.
        let mut body: Vec<Row> = table
            .select(&body_rows)
            .filter(|r| r.select(&td).next().is_some())
            .map(|r| row_of(r, &cells))
            .collect();
        if body.is_empty() {
            let skip = usize::from(!headers.is_empty());
            body = rows.iter().skip(skip).cloned().collect();
        }

        let width = headers.len();
        let make = |rows: Vec<Row>| {
            if width > 0 {
                Table::with_columns(rows, width)
            } else {
                Table::new(rows)
            }
        };

        Ok(Some(TableSnapshot {
            id: table.value().attr("id").map(str::to_string),
            all_rows: make(rows),
            headers,
            body: make(body),
        }))
    }

    /// Form controls inside the first element matching `form_selector`.
    pub fn form_fields(&self, form_selector: &str) -> Result<Option<Vec<FormField>>, HtmlError> {
        let Some(form) = self.first(form_selector)? else {
            return Ok(None);
        };
        let controls = selector("input, select, textarea")?;
        let selected = selector("option[selected]")?;
        let any_option = selector("option")?;

        let fields = form
            .select(&controls)
            .map(|el| {
                let v = el.value();
                let kind = FieldKind::from_tag(v.name());
                let value = match kind {
                    FieldKind::Select => el
                        .select(&selected)
                        .next()
                        .or_else(|| el.select(&any_option).next())
                        .map(|opt| {
                            opt.value()
                                .attr("value")
                                .map(str::to_string)
                                .unwrap_or_else(|| element_text(opt))
                        })
                        .unwrap_or_default(),
                    FieldKind::Textarea => element_text(el),
                    _ => v.attr("value").unwrap_or_default().to_string(),
                };
                let name = v
                    .attr("name")
                    .or_else(|| v.attr("id"))
                    .unwrap_or_default()
                    .to_string();
                let mut field = FormField::new(name, kind, value)
                    .with_type(v.attr("type").unwrap_or_default());
                if let Some(mask) = v.attr("data-mask") {
                    field = field.with_mask(mask);
                }
                field.required = v.attr("required").is_some();
                field
            })
            .collect();
        Ok(Some(fields))
    }
}
