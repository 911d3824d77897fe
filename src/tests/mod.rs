use std::sync::Arc;
use std::time::Instant;

use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::export::{parse_quoted_csv, serialize, DirectorySink, QuotePolicy};
use crate::fetch::{build_client, FetchOptions, RemoteFetch};
use crate::html::Page;
use crate::notify::{NotificationCenter, Severity};
use crate::service::{Toolkit, ToolkitError, ToolkitSettings};
use crate::sort::{sort, SortDirection};
use crate::table::Table;

const LOGS_PAGE: &str = r#"<!DOCTYPE html>
<html><body>
<div class="container" data-auto-refresh data-refresh-interval="15000">
<table class="table" id="logs-table">
  <thead><tr><th>Timestamp</th><th>Device</th><th>Level</th><th>Size</th></tr></thead>
  <tbody>
    <tr><td>2024-05-01 10:00</td><td>fw-01</td><td><span class="badge">ERROR</span></td><td>2,048 KB</td></tr>
    <tr><td>2024-05-01 09:00</td><td>sw-core</td><td><span class="badge">info</span></td><td>512 KB</td></tr>
    <tr><td>2024-05-01 11:00</td><td>ap-lobby
        (2nd floor)</td><td><span class="badge">Warning</span></td><td>n/a</td></tr>
  </tbody>
</table>
</div>
</body></html>"#;

fn toolkit_with(center: Arc<NotificationCenter>, dir: &std::path::Path) -> Toolkit {
    let fetcher = RemoteFetch::new(build_client(None).unwrap(), center.clone());
    Toolkit::new(
        center,
        fetcher,
        Arc::new(DirectorySink::new(dir)),
        ToolkitSettings::default(),
    )
}

#[test]
fn spreadsheet_example_sorts_numerically() {
    let table = Table::from_texts(vec![
        vec!["Banana", "3"],
        vec!["Apple", "10"],
        vec!["Cherry", "2"],
    ]);
    let out = sort(&table, 1, SortDirection::Ascending).unwrap();
    let names: Vec<&str> = out.table.rows.iter().map(|r| r.text_at(0)).collect();
    assert_eq!(names, vec!["Cherry", "Banana", "Apple"]);
}

#[test]
fn export_writes_bom_prefixed_file_from_page() {
    let dir = tempfile::tempdir().unwrap();
    let center = Arc::new(NotificationCenter::new());
    let kit = toolkit_with(center.clone(), dir.path());

    kit.export_table_to_csv(&Page::parse(LOGS_PAGE), "logs.csv", Some("logs-table"))
        .unwrap();

    let bytes = std::fs::read(dir.path().join("logs.csv")).unwrap();
    assert!(bytes.starts_with(&[0xEF, 0xBB, 0xBF]));
    let text = String::from_utf8(bytes).unwrap();
    let rows = parse_quoted_csv(&text);
    assert_eq!(rows.len(), 4);
    assert!(rows.iter().all(|r| r.len() == 4));
    assert_eq!(rows[0], vec!["Timestamp", "Device", "Level", "Size"]);
    assert_eq!(rows[3][1], "ap-lobby (2nd floor)");
    assert!(center.is_empty());
}

#[test]
fn page_sort_by_size_keeps_non_numeric_pairs_lexical() {
    let page = Page::parse(LOGS_PAGE);
    let snap = page.table(None).unwrap().unwrap();
    let out = sort(&snap.body, 3, SortDirection::Ascending).unwrap();
    let sizes: Vec<&str> = out.table.rows.iter().map(|r| r.text_at(3)).collect();
    // "n/a" compares lexically against both numbers, so it lands after the digits.
    assert_eq!(sizes, vec!["512 KB", "2,048 KB", "n/a"]);
}

#[test]
fn page_sort_by_level_is_case_insensitive() {
    let page = Page::parse(LOGS_PAGE);
    let snap = page.table(None).unwrap().unwrap();
    let out = sort(&snap.body, 2, SortDirection::Ascending).unwrap();
    let levels: Vec<String> = out
        .table
        .rows
        .iter()
        .map(|r| crate::table::normalize_text(r.text_at(2)))
        .collect();
    assert_eq!(levels, vec!["ERROR", "info", "Warning"]);
}

#[test]
fn serialized_output_round_trips_under_both_policies() {
    let table = Table::from_texts(vec![vec!["a", "b"], vec!["c,d", "e\nf"]]);
    for policy in [QuotePolicy::Doubled, QuotePolicy::Verbatim] {
        let parsed = parse_quoted_csv(&serialize(&table, policy));
        assert_eq!(parsed, vec![vec!["a", "b"], vec!["c,d", "e f"]]);
    }
}

#[tokio::test]
async fn toolkit_fetch_failure_shows_one_banner() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/logs"))
        .and(header("x-requested-with", "logdesk"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let center = Arc::new(NotificationCenter::new());
    let kit = toolkit_with(center.clone(), dir.path());
    let err = kit
        .fetch_data(
            &format!("{}/api/logs", server.uri()),
            FetchOptions::default().header("X-Requested-With", "logdesk"),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ToolkitError::Fetch(_)));
    let banners = center.visible_at(Instant::now());
    assert_eq!(banners.len(), 1);
    assert_eq!(banners[0].severity, Severity::Danger);
}

#[tokio::test]
async fn toolkit_fetch_success_returns_json() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/alerts/resolve"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({"ok": true})))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let center = Arc::new(NotificationCenter::new());
    let kit = toolkit_with(center.clone(), dir.path());
    let value = kit
        .fetch_data(
            &format!("{}/api/alerts/resolve", server.uri()),
            FetchOptions::default()
                .method(reqwest::Method::POST)
                .json_body(&serde_json::json!({"id": 4})),
        )
        .await
        .unwrap();
    assert_eq!(value["ok"], true);
    assert!(center.is_empty());
}
