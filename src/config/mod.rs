use std::env;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    pub base_url: Option<String>,
    #[serde(alias = "notification_duration")]
    pub notification_duration_ms: Option<u64>,
    #[serde(alias = "refresh_interval")]
    pub refresh_interval_ms: Option<u64>,
    pub fetch_timeout: Option<u64>,
    pub quote_policy: Option<String>,
    pub export_dir: Option<String>,
    pub default_filename: Option<String>,
    pub no_color: Option<bool>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found '{path}'")]
    NotFound { path: String },

    #[error("failed to read config '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to write config '{path}': {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

fn home_dir() -> Option<PathBuf> {
    env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(|| env::var_os("USERPROFILE").map(PathBuf::from))
        .or_else(|| {
            let drive = env::var_os("HOMEDRIVE")?;
            let path = env::var_os("HOMEPATH")?;
            Some(PathBuf::from(drive).join(path))
        })
}

pub fn default_config_path() -> Option<PathBuf> {
    Some(home_dir()?.join(".logdesk").join("config.yml"))
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
        if let Some(home) = home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

pub fn expand_tilde_string(path: &str) -> String {
    expand_tilde(path).to_string_lossy().to_string()
}

pub fn parse_config(contents: &str, path: &str) -> Result<ConfigFile, ConfigError> {
    serde_yaml::from_str::<ConfigFile>(contents).map_err(|e| ConfigError::Parse {
        path: path.to_string(),
        source: e,
    })
}

pub fn load_config(path: &PathBuf, allow_missing: bool) -> Result<ConfigFile, ConfigError> {
    let display = path.display().to_string();
    match std::fs::read_to_string(path) {
        Ok(contents) => parse_config(&contents, &display),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && allow_missing => {
            Ok(ConfigFile::default())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(ConfigError::NotFound { path: display })
        }
        Err(e) => Err(ConfigError::Read {
            path: display,
            source: e,
        }),
    }
}

fn default_config_yaml() -> String {
    r#"# logdesk config
#
# Location (default):
#   ~/.logdesk/config.yml

# Console origin used to resolve relative fetch URLs (optional)
# base_url: http://localhost:5000/

# Notifications: how long banners stay up (0 = until dismissed)
notification_duration_ms: 5000

# Auto-refresh interval when the page does not set data-refresh-interval
refresh_interval_ms: 30000

# Fetch timeout in seconds (0 = no timeout)
fetch_timeout: 30

# CSV export
# quote_policy: doubled   # doubled | verbatim
export_dir: .
default_filename: logs.csv

# Output styling
no_color: false
"#
    .to_string()
}

pub fn ensure_default_config_file(path: &PathBuf) -> Result<(), ConfigError> {
    if path.exists() {
        return Ok(());
    }
    let display = path.display().to_string();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
            path: parent.display().to_string(),
            source: e,
        })?;
    }
    std::fs::write(path, default_config_yaml()).map_err(|e| ConfigError::Write {
        path: display,
        source: e,
    })
}
