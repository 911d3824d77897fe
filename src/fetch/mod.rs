use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE, USER_AGENT};
use thiserror::Error;

use crate::notify::{Notifier, Severity, DEFAULT_DURATION};

pub const LOAD_ERROR_MESSAGE: &str = "Failed to load data";

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP error from {url}: status {status}")]
    Status { url: String, status: u16 },

    #[error("invalid JSON body from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },

    #[error("invalid header {name}")]
    InvalidHeader { name: String },

    #[error("failed to build HTTP client: {source}")]
    HttpClientBuild {
        #[source]
        source: reqwest::Error,
    },
}

impl FetchError {
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Transport(TransportError::Status { status, .. }) => Some(*status),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct FetchOptions {
    /// Defaults to GET.
    pub method: Option<reqwest::Method>,
    /// Merged over `Content-Type: application/json`; only same-named keys replace the default.
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
    /// Overrides the client's default timeout for this request.
    pub timeout: Option<Duration>,
}

impl FetchOptions {
    pub fn method(mut self, method: reqwest::Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn json_body(mut self, body: &serde_json::Value) -> Self {
        self.body = Some(body.to_string());
        self
    }
}

/// Parses a `Key: Value` header line.
pub fn parse_header_line(line: &str) -> Option<(String, String)> {
    let (name, value) = line.split_once(':')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some((name.to_string(), value.trim().to_string()))
}

pub fn merge_headers(extra: &[(String, String)]) -> Result<HeaderMap, FetchError> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    for (name, value) in extra {
        let key = HeaderName::from_bytes(name.trim().as_bytes())
            .map_err(|_| FetchError::InvalidHeader { name: name.clone() })?;
        let value = HeaderValue::from_str(value.trim())
            .map_err(|_| FetchError::InvalidHeader { name: name.clone() })?;
        headers.insert(key, value);
    }
    Ok(headers)
}

pub fn build_client(timeout: Option<Duration>) -> Result<reqwest::Client, FetchError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        USER_AGENT,
        HeaderValue::from_static(concat!("logdesk/", env!("CARGO_PKG_VERSION"))),
    );
    let mut builder = reqwest::Client::builder().default_headers(headers);
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder
        .build()
        .map_err(|e| FetchError::HttpClientBuild { source: e })
}

/// JSON retrieval that reports every failure to the user before returning it.
#[derive(Clone)]
pub struct RemoteFetch {
    client: reqwest::Client,
    notifier: Arc<dyn Notifier>,
    base_url: Option<reqwest::Url>,
}

impl RemoteFetch {
    pub fn new(client: reqwest::Client, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            client,
            notifier,
            base_url: None,
        }
    }

    /// Relative URLs are resolved against `base`, like a page resolves them against its origin.
    pub fn with_base_url(mut self, base: reqwest::Url) -> Self {
        self.base_url = Some(base);
        self
    }

    pub fn resolve_url(&self, url: &str) -> Result<reqwest::Url, FetchError> {
        let invalid = || FetchError::InvalidUrl {
            url: url.to_string(),
        };
        if let Ok(parsed) = reqwest::Url::parse(url) {
            return Ok(parsed);
        }
        match self.base_url.as_ref() {
            Some(base) => base.join(url).map_err(|_| invalid()),
            None => Err(invalid()),
        }
    }

    pub async fn fetch_json(
        &self,
        url: &str,
        options: FetchOptions,
    ) -> Result<serde_json::Value, FetchError> {
        match self.request(url, options).await {
            Ok(value) => Ok(value),
            Err(e) => {
                tracing::error!(url, error = %e, "error fetching data");
                self.notifier
                    .show(LOAD_ERROR_MESSAGE, Severity::Danger, DEFAULT_DURATION);
                Err(e)
            }
        }
    }

    async fn request(
        &self,
        url: &str,
        options: FetchOptions,
    ) -> Result<serde_json::Value, FetchError> {
        let target = self.resolve_url(url)?;
        let headers = merge_headers(&options.headers)?;
        let method = options.method.unwrap_or(reqwest::Method::GET);
        let display_url = target.to_string();

        tracing::debug!(%method, url = %display_url, "fetching json");
        let mut req = self.client.request(method, target).headers(headers);
        if let Some(body) = options.body {
            req = req.body(body);
        }
        if let Some(timeout) = options.timeout {
            req = req.timeout(timeout);
        }

        let resp = req.send().await.map_err(|e| TransportError::Network {
            url: display_url.clone(),
            source: e,
        })?;
        let status = resp.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                url: display_url,
                status: status.as_u16(),
            }
            .into());
        }
        let value = resp
            .json::<serde_json::Value>()
            .await
            .map_err(|e| TransportError::Decode {
                url: display_url,
                source: e,
            })?;
        Ok(value)
    }
}
