//! HTTP client for the official live-results feed.

use std::time::Duration;

use async_trait::async_trait;
use chunab_core::{FeedBody, LiveRow};
use reqwest::header::{ACCEPT, COOKIE, HeaderMap, HeaderValue, REFERER};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid header value for {0}")]
    InvalidHeader(&'static str),
}

/// Feed endpoint plus the feed-specific headers it insists on.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    pub url: String,
    /// Referer override; the official feed rejects requests without one.
    pub referer: Option<String>,
    /// Session cookie copied from a browser session.
    pub cookie: Option<String>,
    pub timeout: Duration,
}

impl FeedConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            referer: None,
            cookie: None,
            timeout: Duration::from_secs(20),
        }
    }
}

/// Something that yields the current live rows. The poller only sees this.
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch_rows(&self) -> Result<Vec<LiveRow>, SyncError>;
}

/// reqwest-backed [`FeedSource`].
pub struct FeedClient {
    client: reqwest::Client,
    url: String,
}

fn header_value(name: &'static str, value: &str) -> Result<HeaderValue, SyncError> {
    HeaderValue::from_str(value).map_err(|_| SyncError::InvalidHeader(name))
}

impl FeedClient {
    pub fn new(config: &FeedConfig) -> Result<Self, SyncError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(referer) = &config.referer {
            headers.insert(REFERER, header_value("Referer", referer)?);
        }
        if let Some(cookie) = &config.cookie {
            headers.insert(COOKIE, header_value("Cookie", cookie)?);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            url: config.url.trim().to_string(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl FeedSource for FeedClient {
    async fn fetch_rows(&self) -> Result<Vec<LiveRow>, SyncError> {
        debug!(url = %self.url, "fetching live feed");
        let resp = self.client.get(&self.url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SyncError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let text = resp.text().await?;
        let rows = serde_json::from_str::<FeedBody>(&text)?.into_rows();
        info!(count = rows.len(), "fetched live rows");
        Ok(rows)
    }
}
