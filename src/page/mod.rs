use std::time::Duration;

use chrono::{Days, NaiveDate};
use serde::Serialize;

use crate::html::{element_text, HtmlError, Page};

pub const CONFIRM_MESSAGE: &str = "Are you sure you want to perform this action?";
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_millis(30_000);
const DESTRUCTIVE_ACTIONS: [&str; 3] = ["toggle", "delete", "resolve"];
const DATE_FILTER_LOOKBACK_DAYS: u64 = 7;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TooltipTarget {
    pub tag: String,
    pub title: String,
}

/// Forms posting to toggle/delete/resolve endpoints ask before submitting.
pub fn requires_confirmation(action: &str) -> bool {
    DESTRUCTIVE_ACTIONS.iter().any(|kw| action.contains(kw))
}

pub trait Confirmer {
    fn confirm(&self, message: &str) -> bool;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmitDecision {
    Proceed,
    Cancel,
}

pub fn gate_submit(action: &str, confirmer: &dyn Confirmer) -> SubmitDecision {
    if !requires_confirmation(action) || confirmer.confirm(CONFIRM_MESSAGE) {
        SubmitDecision::Proceed
    } else {
        SubmitDecision::Cancel
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub date_from: String,
    pub date_to: String,
}

/// Fills empty `date_from` / `date_to` with a week ending `today`; filled values are kept.
pub fn default_date_range(date_from: &str, date_to: &str, today: NaiveDate) -> DateRange {
    let to = if date_to.is_empty() {
        today.format("%Y-%m-%d").to_string()
    } else {
        date_to.to_string()
    };
    let from = if date_from.is_empty() {
        today
            .checked_sub_days(Days::new(DATE_FILTER_LOOKBACK_DAYS))
            .unwrap_or(today)
            .format("%Y-%m-%d")
            .to_string()
    } else {
        date_from.to_string()
    };
    DateRange {
        date_from: from,
        date_to: to,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    Hidden,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshAction {
    Reload,
    Skip,
}

/// Full-page reload timer that stays quiet while the tab is in the background.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct AutoRefresh {
    pub interval: Duration,
}

impl AutoRefresh {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn tick(&self, visibility: Visibility) -> RefreshAction {
        match visibility {
            Visibility::Visible => RefreshAction::Reload,
            Visibility::Hidden => RefreshAction::Skip,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct PageSetup {
    pub tooltips: Vec<TooltipTarget>,
    pub destructive_forms: Vec<String>,
    pub date_range: Option<DateRange>,
    pub auto_refresh: Option<AutoRefresh>,
}

fn field_value(page: &Page, id: &str) -> Option<String> {
    page.by_id(id)
        .map(|el| el.value().attr("value").unwrap_or_default().to_string())
}

/// Collects every affordance the page wires up on load.
pub fn scan(page: &Page, today: NaiveDate, default_interval: Duration) -> Result<PageSetup, HtmlError> {
    let tooltips = page
        .select_all(r#"[data-bs-toggle="tooltip"]"#)?
        .into_iter()
        .map(|el| TooltipTarget {
            tag: el.value().name().to_string(),
            title: el
                .value()
                .attr("title")
                .or_else(|| el.value().attr("data-bs-title"))
                .map(str::to_string)
                .unwrap_or_else(|| element_text(el).trim().to_string()),
        })
        .collect();

    let destructive_forms = page
        .select_all("form[action]")?
        .into_iter()
        .filter_map(|el| el.value().attr("action"))
        .filter(|action| requires_confirmation(action))
        .map(str::to_string)
        .collect();

    let from = field_value(page, "date_from");
    let to = field_value(page, "date_to");
    let date_range = if from.is_some() || to.is_some() {
        Some(default_date_range(
            from.as_deref().unwrap_or_default(),
            to.as_deref().unwrap_or_default(),
            today,
        ))
    } else {
        None
    };

    let auto_refresh = page.first("[data-auto-refresh]")?.map(|el| {
        let interval = el
            .value()
            .attr("data-refresh-interval")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
            .unwrap_or(default_interval);
        AutoRefresh::new(interval)
    });

    Ok(PageSetup {
        tooltips,
        destructive_forms,
        date_range,
        auto_refresh,
    })
}
