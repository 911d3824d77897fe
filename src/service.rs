use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::export::{self, DownloadSink, ExportError, QuotePolicy};
use crate::fetch::{FetchError, FetchOptions, RemoteFetch};
use crate::format::{self, FormatError};
use crate::html::{HtmlError, Page};
use crate::notify::{NotificationId, Notifier, Severity, DEFAULT_DURATION};
use crate::sort::{self, SortDirection, SortIndicators, SortOutcome};
use crate::table::TableError;
use crate::validate::{self, FormField};

pub const NO_TABLE_MESSAGE: &str = "No table found to export.";
pub const NO_SORT_TABLE_MESSAGE: &str = "No table found to sort.";

fn table_suffix(table_id: &Option<String>) -> String {
    table_id
        .as_deref()
        .map(|id| format!(" with id '{id}'"))
        .unwrap_or_default()
}

#[derive(Debug, Error)]
pub enum ToolkitError {
    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Table(#[from] TableError),

    #[error("no table found{}", table_suffix(.table_id))]
    TableNotFound { table_id: Option<String> },

    #[error(transparent)]
    Html(#[from] HtmlError),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

#[derive(Clone, Debug)]
pub struct ToolkitSettings {
    pub quote_policy: QuotePolicy,
    pub notification_duration: Duration,
}

impl Default for ToolkitSettings {
    fn default() -> Self {
        Self {
            quote_policy: QuotePolicy::default(),
            notification_duration: DEFAULT_DURATION,
        }
    }
}

/// The console's helper surface, built once at startup and handed to whatever drives the page.
#[derive(Clone)]
pub struct Toolkit {
    notifier: Arc<dyn Notifier>,
    fetcher: RemoteFetch,
    sink: Arc<dyn DownloadSink>,
    settings: ToolkitSettings,
}

/// Result of sorting a page table: the new body order plus the header markers to render.
#[derive(Clone, Debug)]
pub struct SortedTable {
    pub outcome: SortOutcome,
    pub headers: Vec<String>,
    pub indicators: SortIndicators,
}

impl Toolkit {
    pub fn new(
        notifier: Arc<dyn Notifier>,
        fetcher: RemoteFetch,
        sink: Arc<dyn DownloadSink>,
        settings: ToolkitSettings,
    ) -> Self {
        Self {
            notifier,
            fetcher,
            sink,
            settings,
        }
    }

    pub fn settings(&self) -> &ToolkitSettings {
        &self.settings
    }

    /// Shows a banner for `duration`, or for the configured default when `None`.
    /// `Some(Duration::ZERO)` keeps it up until dismissed.
    pub fn show_notification(
        &self,
        message: &str,
        severity: Severity,
        duration: Option<Duration>,
    ) -> NotificationId {
        self.notifier.show(
            message,
            severity,
            duration.unwrap_or(self.settings.notification_duration),
        )
    }

    fn report_missing_table(&self, table_id: Option<&str>, message: &str) {
        tracing::warn!(table_id, message, "no table found");
        self.notifier.show(message, Severity::Danger, Duration::ZERO);
    }

    /// Exports the table with `table_id` (or the first table) as `filename`.
    ///
    /// A missing or empty table is reported to the user before the error is returned.
    pub fn export_table_to_csv(
        &self,
        page: &Page,
        filename: &str,
        table_id: Option<&str>,
    ) -> Result<(), ToolkitError> {
        let snapshot = page.table(table_id)?;
        let result = export::export_to_file(
            snapshot.as_ref().map(|s| &s.all_rows),
            filename,
            self.settings.quote_policy,
            self.sink.as_ref(),
        );
        if let Err(ExportError::NoTableFound) = &result {
            self.report_missing_table(table_id, NO_TABLE_MESSAGE);
        }
        Ok(result?)
    }

    pub fn sort_table(
        &self,
        page: &Page,
        table_id: Option<&str>,
        column: usize,
        direction: SortDirection,
    ) -> Result<SortedTable, ToolkitError> {
        let Some(snapshot) = page.table(table_id)? else {
            self.report_missing_table(table_id, NO_SORT_TABLE_MESSAGE);
            return Err(ToolkitError::TableNotFound {
                table_id: table_id.map(str::to_string),
            });
        };
        let outcome = sort::sort(&snapshot.body, column, direction)?;
        let mut indicators = SortIndicators::new(snapshot.body.column_count());
        indicators.apply_outcome(&outcome)?;
        Ok(SortedTable {
            outcome,
            headers: snapshot.headers,
            indicators,
        })
    }

    pub fn validate_form(&self, fields: &mut [FormField]) -> bool {
        validate::validate_required(fields)
    }

    pub async fn fetch_data(
        &self,
        url: &str,
        options: FetchOptions,
    ) -> Result<serde_json::Value, ToolkitError> {
        Ok(self.fetcher.fetch_json(url, options).await?)
    }

    pub fn format_date(&self, value: &str) -> Result<String, FormatError> {
        format::format_date(value)
    }

    pub fn format_bytes(&self, bytes: u64, decimals: i32) -> String {
        format::format_bytes(bytes, decimals)
    }

    pub fn format_duration(&self, seconds: u64) -> String {
        format::format_duration(seconds)
    }
}
