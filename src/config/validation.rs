use crate::config::types::{BoardConfig, Config, CrawlerConfig, OutputConfig, RangeConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
///
/// Scrape-mode selection is not checked here; the range resolver owns it so
/// that command-line overrides can be applied to the loaded file first.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_board_config(&config.board)?;
    validate_range_config(&config.range)?;
    validate_crawler_config(&config.crawler)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates board identity
fn validate_board_config(config: &BoardConfig) -> Result<(), ConfigError> {
    if config.id.is_empty() {
        return Err(ConfigError::Validation("board id cannot be empty".to_string()));
    }

    if !config
        .id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(ConfigError::Validation(format!(
            "board id must contain only alphanumeric characters and underscores, got '{}'",
            config.id
        )));
    }

    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ConfigError::Validation(format!(
            "base-url '{}' must use http or https",
            config.base_url
        )));
    }

    Ok(())
}

/// Validates that any dates given are well formed
fn validate_range_config(config: &RangeConfig) -> Result<(), ConfigError> {
    config.bounds().map(|_| ())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.batch_size < 1 {
        return Err(ConfigError::Validation(format!(
            "batch-size must be >= 1, got {}",
            config.batch_size
        )));
    }

    if config.comment_wait_ms < 1 {
        return Err(ConfigError::Validation(format!(
            "comment-wait-ms must be >= 1ms, got {}ms",
            config.comment_wait_ms
        )));
    }

    if config.page_load_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "page-load-timeout-secs must be >= 1, got {}",
            config.page_load_timeout_secs
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.jsonl_path.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "jsonl-path cannot be empty".to_string(),
        ));
    }

    Ok(())
}
