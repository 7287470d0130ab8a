//! HTTP fetcher implementation
//!
//! The crawl loop only sees the [`FetchService`] trait. [`HttpFetcher`] is the
//! reqwest-backed implementation used by the binary:
//! - Builds the HTTP client from the fetch configuration
//! - Follows a bounded number of redirects
//! - Rejects non-2xx responses and non-HTML bodies
//! - Classifies network errors
//!
//! No retries happen here; a failed fetch discards its page.

use crate::config::FetchConfig;
use crate::FetchError;
use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, redirect::Policy, Client};
use std::time::Duration;
use url::Url;

/// A successfully fetched page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub final_url: String,
    /// HTTP status code
    pub status: u16,
    /// Page body
    pub markup: String,
}

/// Anything that can turn a URL into page markup
#[async_trait]
pub trait FetchService: Send + Sync {
    /// Fetches one URL
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use news_ripple::config::FetchConfig;
/// use news_ripple::crawler::build_http_client;
///
/// let client = build_http_client(&FetchConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &FetchConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.timeout))
        .connect_timeout(Duration::from_secs(config.timeout.min(10)))
        .redirect(Policy::limited(config.max_redirects))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetch service backed by a reqwest client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher from the fetch configuration
    pub fn new(config: &FetchConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
        })
    }

    /// Wraps an existing client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

/// Returns true if a Content-Type value names an HTML document
///
/// A missing header is accepted; many news sites omit it on cached pages.
pub fn is_html_content_type(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    mime.is_empty() || mime == "text/html" || mime == "application/xhtml+xml"
}

fn classify_error(url: &Url, error: reqwest::Error) -> FetchError {
    let url = url.to_string();
    if error.is_timeout() {
        FetchError::Timeout { url }
    } else if error.is_connect() {
        FetchError::Unreachable {
            url,
            message: error.to_string(),
        }
    } else {
        FetchError::Http { url, source: error }
    }
}

#[async_trait]
impl FetchService for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status();
        let final_url = response.url().to_string();

        if !status.is_success() {
            return Err(FetchError::Status {
                url: final_url,
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if !is_html_content_type(&content_type) {
            return Err(FetchError::ContentMismatch {
                url: final_url,
                content_type,
            });
        }

        let markup = response.text().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout {
                    url: final_url.clone(),
                }
            } else {
                FetchError::Body {
                    url: final_url.clone(),
                    message: e.to_string(),
                }
            }
        })?;

        Ok(FetchedPage {
            final_url,
            status: status.as_u16(),
            markup,
        })
    }
}
