//! Crawler module: range resolution and the traversal engine
//!
//! This module contains the core harvesting logic, including:
//! - Resolving scrape bounds into a starting traversal
//! - Loading the dedup index from the store
//! - Driving the traversal engine
//! - Releasing the browser on every exit path

mod engine;
mod range;

pub use engine::{EngineOptions, RunSummary, TraversalEngine};
pub use range::{resolve, select_mode, ScrapeMode};

use crate::board::Board;
use crate::config::{Config, ScrapeBounds};
use crate::extract::{
    build_http_client, BoardClient, BoardIndex, BrowserCommentSource, BrowserOptions, PostSource,
};
use crate::storage::{BatchWriter, DedupIndex, JsonlStore, RecordSink};
use crate::HarvestError;
use std::path::Path;
use tokio_util::sync::CancellationToken;

/// Everything a harvest needs besides its collaborators
#[derive(Debug, Clone)]
pub struct HarvestPlan<'a> {
    pub board: &'a Board,
    pub bounds: ScrapeBounds,
    pub store_path: &'a Path,
    pub batch_size: usize,
    pub options: EngineOptions,
}

/// Runs one harvest against explicit collaborators
///
/// 1. Resolve the bounds (configuration errors surface before any request)
/// 2. Check the board exists and pick the starting cursor
/// 3. Load the dedup index from the store
/// 4. Drive the traversal, flushing into `sink`
pub async fn harvest<S, W>(
    plan: &HarvestPlan<'_>,
    source: &S,
    sink: W,
    cancel: CancellationToken,
) -> Result<RunSummary, HarvestError>
where
    S: PostSource + BoardIndex + ?Sized,
    W: RecordSink,
{
    let traversal = resolve(source, plan.board, &plan.bounds).await?;

    let dedup = DedupIndex::load(plan.store_path);

    let engine = TraversalEngine::new(
        plan.board,
        source,
        &dedup,
        BatchWriter::new(sink, plan.batch_size),
        plan.options,
        cancel,
    );
    engine.run(traversal).await
}

/// Runs a complete harvest from configuration
///
/// Builds the HTTP client and the browser-backed comment source, appends to
/// the configured JSONL store, and shuts the browser down whether the run
/// succeeds, fails, or is interrupted.
///
/// # Example
///
/// ```no_run
/// use board_harvest::config::load_config;
/// use board_harvest::crawler::run_harvest;
/// use std::path::Path;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("harvest.toml"))?;
/// let summary = run_harvest(&config, CancellationToken::new()).await?;
/// println!("Collected {} posts", summary.collected);
/// # Ok(())
/// # }
/// ```
pub async fn run_harvest(
    config: &Config,
    cancel: CancellationToken,
) -> Result<RunSummary, HarvestError> {
    let board = config.board.to_board()?;
    let bounds = config.range.bounds()?;

    let client = build_http_client(&config.crawler)?;
    let comments = BrowserCommentSource::new(BrowserOptions {
        headless: config.crawler.headless,
        comment_wait: config.crawler.comment_wait(),
        page_timeout: config.crawler.page_load_timeout(),
    });
    let source = BoardClient::new(client, comments);

    let plan = HarvestPlan {
        board: &board,
        bounds,
        store_path: &config.output.jsonl_path,
        batch_size: config.crawler.batch_size,
        options: EngineOptions::from(&config.crawler),
    };

    let result = harvest(
        &plan,
        &source,
        JsonlStore::new(&config.output.jsonl_path),
        cancel,
    )
    .await;

    source.shutdown().await;
    result
}
