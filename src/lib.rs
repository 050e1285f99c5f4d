//! Board Harvest: an incremental forum board harvester
//!
//! This crate walks a numerically-indexed forum board post by post, either
//! over an explicit post-number range or backwards over a calendar-date
//! window, and appends deduplicated post records (with their comment threads)
//! to a JSONL store. Runs are resumable: ids already present in the store are
//! skipped on the next run.

pub mod board;
pub mod config;
pub mod crawler;
pub mod extract;
pub mod output;
pub mod post;
pub mod state;
pub mod storage;

use thiserror::Error;

/// Main error type for Board Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
///
/// Every variant is raised before any network activity takes place.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid date '{0}', expected YYYY.MM.DD")]
    InvalidDate(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Errors raised while fetching or extracting a single post
///
/// These never abort a traversal: the engine logs them and moves on.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Unexpected HTTP status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Post {post_id} is missing required field '{field}'")]
    MissingField { post_id: u64, field: &'static str },

    #[error("Post {post_id} has an unparseable date '{raw}'")]
    InvalidDate { post_id: u64, raw: String },

    #[error("Post {post_id} has a non-numeric {field}: '{raw}'")]
    InvalidCount {
        post_id: u64,
        field: &'static str,
        raw: String,
    },

    #[error("Invalid selector '{0}'")]
    Selector(String),

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("URL error: {0}")]
    Url(#[from] ::url::ParseError),
}

/// Result type alias for Board Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for single-post fetches
pub type FetchResult<T> = std::result::Result<T, FetchError>;

// Re-export commonly used types
pub use board::{Board, BoardKind};
pub use config::Config;
pub use post::{Comment, PostRecord};
pub use state::{Traversal, TraversalState};
