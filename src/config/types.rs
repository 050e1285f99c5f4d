use crate::board::{Board, BoardKind, DEFAULT_BASE_URL};
use crate::post::parse_date;
use crate::ConfigError;
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// User agent sent with every plain HTTP request
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Main configuration structure for Board Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub board: BoardConfig,
    #[serde(default)]
    pub range: RangeConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    pub output: OutputConfig,
}

/// Which board to harvest
#[derive(Debug, Clone, Deserialize)]
pub struct BoardConfig {
    /// Board identifier as it appears in the `id=` query parameter
    pub id: String,

    /// Board type: main, minor or mini
    #[serde(rename = "type")]
    pub kind: BoardKind,

    /// Host serving the board
    #[serde(rename = "base-url", default = "default_base_url")]
    pub base_url: String,
}

impl BoardConfig {
    pub fn to_board(&self) -> Result<Board, ConfigError> {
        let base_url = Url::parse(&self.base_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;
        Ok(Board::new(self.id.clone(), self.kind, base_url))
    }
}

/// Scrape bounds as written in the file; exactly one pair must be set
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RangeConfig {
    #[serde(rename = "start-id")]
    pub start_id: Option<u64>,

    #[serde(rename = "end-id")]
    pub end_id: Option<u64>,

    /// First day of the window, `YYYY.MM.DD`
    #[serde(rename = "start-date")]
    pub start_date: Option<String>,

    /// Last day of the window, `YYYY.MM.DD`
    #[serde(rename = "end-date")]
    pub end_date: Option<String>,
}

impl RangeConfig {
    /// Converts the raw bounds into typed ones
    pub fn bounds(&self) -> Result<ScrapeBounds, ConfigError> {
        Ok(ScrapeBounds {
            start_id: self.start_id,
            end_id: self.end_id,
            start_date: self.start_date.as_deref().map(typed_date).transpose()?,
            end_date: self.end_date.as_deref().map(typed_date).transpose()?,
        })
    }
}

fn typed_date(raw: &str) -> Result<NaiveDate, ConfigError> {
    parse_date(raw).ok_or_else(|| ConfigError::InvalidDate(raw.to_string()))
}

/// The four optional bounds handed to the range resolver
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrapeBounds {
    pub start_id: Option<u64>,
    pub end_id: Option<u64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Whether comment threads are harvested
    #[serde(rename = "crawl-comments", default = "default_true")]
    pub crawl_comments: bool,

    /// How long to wait for rendered comments before reloading (milliseconds)
    #[serde(rename = "comment-wait-ms", default = "default_comment_wait_ms")]
    pub comment_wait_ms: u64,

    /// Fixed delay between post requests (milliseconds)
    #[serde(rename = "request-delay-ms", default = "default_request_delay_ms")]
    pub request_delay_ms: u64,

    /// Run the browser without a window
    #[serde(default = "default_true")]
    pub headless: bool,

    /// Number of posts buffered before a flush
    #[serde(rename = "batch-size", default = "default_batch_size")]
    pub batch_size: usize,

    /// Browser page load timeout (seconds)
    #[serde(rename = "page-load-timeout-secs", default = "default_page_load_timeout_secs")]
    pub page_load_timeout_secs: u64,

    /// User agent for plain HTTP requests
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,
}

impl CrawlerConfig {
    pub fn comment_wait(&self) -> Duration {
        Duration::from_millis(self.comment_wait_ms)
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn page_load_timeout(&self) -> Duration {
        Duration::from_secs(self.page_load_timeout_secs)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            crawl_comments: true,
            comment_wait_ms: default_comment_wait_ms(),
            request_delay_ms: default_request_delay_ms(),
            headless: true,
            batch_size: default_batch_size(),
            page_load_timeout_secs: default_page_load_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the append-only JSONL store
    #[serde(rename = "jsonl-path")]
    pub jsonl_path: PathBuf,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_true() -> bool {
    true
}

fn default_comment_wait_ms() -> u64 {
    500
}

fn default_request_delay_ms() -> u64 {
    500
}

fn default_batch_size() -> usize {
    100
}

fn default_page_load_timeout_secs() -> u64 {
    10
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}
