use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};
use thiserror::Error;

const BYTE_UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];
const DISPLAY_LAYOUT: &str = "%d/%m/%Y %H:%M:%S";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    #[error("invalid date: {value}")]
    InvalidDate { value: String },
}

fn parse_naive(value: &str) -> Option<NaiveDateTime> {
    const LAYOUTS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
    ];
    LAYOUTS
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(value, layout).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Formats an ISO-8601 timestamp as `dd/mm/yyyy hh:mm:ss`.
///
/// Timestamps carrying an offset are shown in `tz`; naive ones are shown as written.
pub fn format_date_in<Tz>(value: &str, tz: &Tz) -> Result<String, FormatError>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let trimmed = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(tz).format(DISPLAY_LAYOUT).to_string());
    }
    parse_naive(trimmed)
        .map(|dt| dt.format(DISPLAY_LAYOUT).to_string())
        .ok_or_else(|| FormatError::InvalidDate {
            value: value.to_string(),
        })
}

pub fn format_date(value: &str) -> Result<String, FormatError> {
    format_date_in(value, &Local)
}

/// Human-readable size with base-1024 units; trailing zeros are dropped (`1.50` -> `1.5`).
pub fn format_bytes(bytes: u64, decimals: i32) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let decimals = decimals.max(0) as usize;
    let mut exp = 0usize;
    let mut scaled = bytes as f64;
    while scaled >= 1024.0 && exp < BYTE_UNITS.len() - 1 {
        scaled /= 1024.0;
        exp += 1;
    }
    let mut rendered = format!("{scaled:.decimals$}");
    if rendered.contains('.') {
        rendered = rendered.trim_end_matches('0').trim_end_matches('.').to_string();
    }
    format!("{rendered} {}", BYTE_UNITS[exp])
}

pub fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if hours > 0 {
        format!("{hours}h {minutes}m {secs}s")
    } else if minutes > 0 {
        format!("{minutes}m {secs}s")
    } else {
        format!("{secs}s")
    }
}
