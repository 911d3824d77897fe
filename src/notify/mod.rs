use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use colored::Colorize;
use serde::{Deserialize, Serialize};

pub const DEFAULT_DURATION: Duration = Duration::from_millis(5000);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Info,
    Success,
    Warning,
    Danger,
}

impl Severity {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "info" => Some(Self::Info),
            "success" => Some(Self::Success),
            "warning" | "warn" => Some(Self::Warning),
            "danger" | "error" => Some(Self::Danger),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Warning => "warning",
            Severity::Danger => "danger",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NotificationId(pub u64);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Banner {
    pub id: NotificationId,
    pub message: String,
    pub severity: Severity,
    pub shown_at: Instant,
    /// `None` stays until dismissed.
    pub expires_at: Option<Instant>,
}

impl Banner {
    pub fn is_persistent(&self) -> bool {
        self.expires_at.is_none()
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

/// Shows transient banners to the user. A zero duration keeps the banner until dismissed.
pub trait Notifier: Send + Sync {
    fn show(&self, message: &str, severity: Severity, duration: Duration) -> NotificationId;
}

/// Every banner currently on screen, in insertion order. No dedup, no cap.
#[derive(Debug, Default)]
pub struct NotificationCenter {
    next_id: AtomicU64,
    banners: Mutex<Vec<Banner>>,
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self::default()
    }

    fn banners(&self) -> MutexGuard<'_, Vec<Banner>> {
        self.banners.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn push_at(
        &self,
        message: &str,
        severity: Severity,
        duration: Duration,
        now: Instant,
    ) -> NotificationId {
        let id = NotificationId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        let expires_at = if duration.is_zero() {
            None
        } else {
            Some(now + duration)
        };
        let banner = Banner {
            id,
            message: message.to_string(),
            severity,
            shown_at: now,
            expires_at,
        };
        self.banners().push(banner);
        id
    }

    pub fn dismiss(&self, id: NotificationId) -> bool {
        let mut banners = self.banners();
        let before = banners.len();
        banners.retain(|b| b.id != id);
        banners.len() != before
    }

    /// Removes and returns banners whose timer has run out.
    pub fn drain_expired(&self, now: Instant) -> Vec<Banner> {
        let mut banners = self.banners();
        let (expired, alive): (Vec<Banner>, Vec<Banner>) =
            banners.drain(..).partition(|b| b.is_expired(now));
        *banners = alive;
        expired
    }

    pub fn visible_at(&self, now: Instant) -> Vec<Banner> {
        self.drain_expired(now);
        self.banners().clone()
    }

    pub fn len(&self) -> usize {
        self.banners().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Notifier for NotificationCenter {
    fn show(&self, message: &str, severity: Severity, duration: Duration) -> NotificationId {
        self.push_at(message, severity, duration, Instant::now())
    }
}

/// Prints banners to stderr and tracks them in a [`NotificationCenter`].
#[derive(Debug, Default)]
pub struct TerminalNotifier {
    center: NotificationCenter,
}

impl TerminalNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn center(&self) -> &NotificationCenter {
        &self.center
    }
}

fn render_banner(message: &str, severity: Severity) -> String {
    let tag = format!("[{}]", severity.label());
    let tag = match severity {
        Severity::Info => tag.cyan(),
        Severity::Success => tag.green(),
        Severity::Warning => tag.yellow(),
        Severity::Danger => tag.red().bold(),
    };
    format!(":: {tag} {message}")
}

impl Notifier for TerminalNotifier {
    fn show(&self, message: &str, severity: Severity, duration: Duration) -> NotificationId {
        eprintln!("{}", render_banner(message, severity));
        self.center.show(message, severity, duration)
    }
}
