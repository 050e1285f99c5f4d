//! HTTP fetcher implementation
//!
//! This module handles all plain HTTP requests, including:
//! - Building the HTTP client with the configured user agent
//! - GET requests for post and listing pages
//! - Classifying responses into page, not-found, or error

use crate::config::CrawlerConfig;
use crate::FetchError;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use url::Url;

/// Outcome of a single page request
#[derive(Debug)]
pub enum PageFetch {
    /// The page was served
    Page {
        /// Page body content
        body: String,
    },

    /// The server answered 404
    NotFound,
}

/// Builds an HTTP client with proper configuration
///
/// The user agent comes from the crawler configuration; nothing about the
/// request headers is process-wide state.
///
/// # Example
///
/// ```no_run
/// use board_harvest::config::CrawlerConfig;
/// use board_harvest::extract::build_http_client;
///
/// let client = build_http_client(&CrawlerConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &CrawlerConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a page
///
/// | Condition | Result |
/// |-----------|--------|
/// | 2xx | `Page` |
/// | 404 | `NotFound` |
/// | any other status | `FetchError::Status` |
/// | transport failure | `FetchError::Http` |
pub async fn fetch_page(client: &Client, url: &Url) -> Result<PageFetch, FetchError> {
    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|source| FetchError::Http {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        return Ok(PageFetch::NotFound);
    }

    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response.text().await.map_err(|source| FetchError::Http {
        url: url.to_string(),
        source,
    })?;

    Ok(PageFetch::Page { body })
}
