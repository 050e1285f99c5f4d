//! Traversal engine - the per-post fetch/decide/advance loop
//!
//! This module contains the main harvest loop, including:
//! - Asking the post source for one post per step
//! - Consulting the dedup index
//! - Reconciling fetched dates against the date window
//! - Feeding records to the batch writer
//! - Pacing requests and handling interrupts

use crate::board::Board;
use crate::config::CrawlerConfig;
use crate::extract::PostSource;
use crate::post::{PostRecord, DATE_FORMAT};
use crate::state::{DateWindow, Traversal, WindowPosition};
use crate::storage::{BatchWriter, DedupIndex, RecordSink};
use crate::HarvestError;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Engine behavior switches
#[derive(Debug, Clone, Copy)]
pub struct EngineOptions {
    /// Fetch comment threads for collected posts
    pub crawl_comments: bool,
    /// Fixed delay between post requests
    pub request_delay: Duration,
}

impl From<&CrawlerConfig> for EngineOptions {
    fn from(config: &CrawlerConfig) -> Self {
        Self {
            crawl_comments: config.crawl_comments,
            request_delay: config.request_delay(),
        }
    }
}

/// Counters reported at the end of a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Cursor positions examined
    pub visited: usize,
    pub collected: usize,
    /// Posts skipped because an earlier run stored them
    pub duplicates: usize,
    /// Deleted or never-existing posts
    pub missing: usize,
    pub failures: usize,
    /// Posts newer than the date window
    pub out_of_window: usize,
    /// Records written to the store during this run
    pub flushed: usize,
    /// The run was cut short by an interrupt
    pub interrupted: bool,
}

/// What a single step observed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StepOutcome {
    Collected,
    Duplicate,
    Missing,
    Failed,
    OutOfWindow,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Decision {
    /// Move the cursor; `pace` inserts the request delay first
    Advance { pace: bool },
    Terminate,
}

struct Step {
    record: Option<PostRecord>,
    outcome: StepOutcome,
    decision: Decision,
}

impl Step {
    fn advance(record: Option<PostRecord>, outcome: StepOutcome, pace: bool) -> Self {
        Self {
            record,
            outcome,
            decision: Decision::Advance { pace },
        }
    }

    fn terminate() -> Self {
        Self {
            record: None,
            outcome: StepOutcome::Stopped,
            decision: Decision::Terminate,
        }
    }
}

/// Result of one call into the post source
enum Fetched {
    Found(PostRecord),
    Missing,
    Failed,
}

/// Drives a traversal to completion or interruption
pub struct TraversalEngine<'a, P: PostSource + ?Sized, W: RecordSink> {
    board: &'a Board,
    source: &'a P,
    dedup: &'a DedupIndex,
    writer: BatchWriter<W>,
    options: EngineOptions,
    cancel: CancellationToken,
    summary: RunSummary,
}

impl<'a, P: PostSource + ?Sized, W: RecordSink> TraversalEngine<'a, P, W> {
    pub fn new(
        board: &'a Board,
        source: &'a P,
        dedup: &'a DedupIndex,
        writer: BatchWriter<W>,
        options: EngineOptions,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            board,
            source,
            dedup,
            writer,
            options,
            cancel,
            summary: RunSummary::default(),
        }
    }

    /// Runs the traversal
    ///
    /// Per-post failures never escape this loop. The only errors returned are
    /// storage failures while flushing. On interruption the pending batch is
    /// flushed before returning, and the summary is marked `interrupted`.
    pub async fn run(mut self, mut traversal: Traversal) -> Result<RunSummary, HarvestError> {
        let cancel = self.cancel.clone();
        let start_time = Instant::now();
        tracing::info!("Starting traversal of {} ({})", self.board, traversal.state());

        while !traversal.is_terminated() {
            if cancel.is_cancelled() {
                return self.interrupt();
            }

            let step = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                step = self.step(&traversal) => Some(step),
            };
            let Some(step) = step else {
                return self.interrupt();
            };

            self.tally(step.outcome);
            if let Some(record) = step.record {
                tracing::info!("Collected post {}", record.post_id);
                self.writer.append(record);
                self.writer.flush_if_threshold()?;
            }

            match step.decision {
                Decision::Terminate => traversal = Traversal::Terminated,
                Decision::Advance { pace } => {
                    traversal = traversal.advance();
                    if pace && !traversal.is_terminated() && !self.pause(&cancel).await {
                        return self.interrupt();
                    }
                }
            }
        }

        self.writer.flush_final()?;
        self.summary.flushed = self.writer.flushed();

        tracing::info!(
            "Traversal finished in {:?}: {} visited, {} collected, {} duplicates, {} missing, {} failed",
            start_time.elapsed(),
            self.summary.visited,
            self.summary.collected,
            self.summary.duplicates,
            self.summary.missing,
            self.summary.failures
        );

        Ok(self.summary)
    }

    /// Sleeps the request delay; returns false if interrupted while waiting
    async fn pause(&self, cancel: &CancellationToken) -> bool {
        if self.options.request_delay.is_zero() {
            return true;
        }
        tokio::select! {
            biased;
            _ = cancel.cancelled() => false,
            _ = tokio::time::sleep(self.options.request_delay) => true,
        }
    }

    fn interrupt(mut self) -> Result<RunSummary, HarvestError> {
        tracing::warn!(
            "Interrupted; flushing {} pending posts",
            self.writer.pending()
        );
        self.writer.flush_final()?;
        self.summary.flushed = self.writer.flushed();
        self.summary.interrupted = true;
        Ok(self.summary)
    }

    fn tally(&mut self, outcome: StepOutcome) {
        self.summary.visited += 1;
        match outcome {
            StepOutcome::Collected => self.summary.collected += 1,
            StepOutcome::Duplicate => self.summary.duplicates += 1,
            StepOutcome::Missing => self.summary.missing += 1,
            StepOutcome::Failed => self.summary.failures += 1,
            StepOutcome::OutOfWindow => self.summary.out_of_window += 1,
            StepOutcome::Stopped => {}
        }
    }

    async fn step(&self, traversal: &Traversal) -> Step {
        match *traversal {
            Traversal::AscendingById { cursor, end } if cursor <= end => {
                self.ascending_step(cursor).await
            }
            Traversal::DescendingByDate { cursor, window } => {
                self.descending_step(cursor, window).await
            }
            _ => Step::terminate(),
        }
    }

    async fn ascending_step(&self, cursor: u64) -> Step {
        if self.dedup.contains(cursor) {
            tracing::info!("Post {} already collected. Skipping...", cursor);
            return Step::advance(None, StepOutcome::Duplicate, false);
        }

        tracing::info!("Processing post {}...", cursor);
        // No retry: failures are counted and the cursor moves on
        match self.fetch(cursor, self.options.crawl_comments).await {
            Fetched::Found(post) => Step::advance(Some(post), StepOutcome::Collected, true),
            Fetched::Missing => Step::advance(None, StepOutcome::Missing, true),
            Fetched::Failed => Step::advance(None, StepOutcome::Failed, true),
        }
    }

    async fn descending_step(&self, cursor: u64, window: DateWindow) -> Step {
        let post = match self.fetch(cursor, false).await {
            Fetched::Found(post) => post,
            // Deleted posts carry no date; step past them without pacing
            Fetched::Missing => return Step::advance(None, StepOutcome::Missing, false),
            Fetched::Failed => return Step::advance(None, StepOutcome::Failed, true),
        };

        match window.position(post.date) {
            WindowPosition::Before => {
                tracing::info!(
                    "Post {} dated {} predates {}. Stopping.",
                    cursor,
                    post.date.format(DATE_FORMAT),
                    window
                );
                Step::terminate()
            }
            WindowPosition::After => {
                tracing::info!(
                    "Post {} dated {} is after the window end.",
                    cursor,
                    post.date.format(DATE_FORMAT)
                );
                Step::advance(None, StepOutcome::OutOfWindow, true)
            }
            WindowPosition::Within if self.dedup.contains(cursor) => {
                tracing::info!("Post {} already collected. Skipping...", cursor);
                Step::advance(None, StepOutcome::Duplicate, true)
            }
            WindowPosition::Within if !self.options.crawl_comments => {
                Step::advance(Some(post), StepOutcome::Collected, true)
            }
            WindowPosition::Within => {
                tracing::info!("Processing post {} with comments...", cursor);
                match self.fetch(cursor, true).await {
                    Fetched::Found(full) => Step::advance(Some(full), StepOutcome::Collected, true),
                    Fetched::Missing => Step::advance(None, StepOutcome::Missing, true),
                    Fetched::Failed => Step::advance(None, StepOutcome::Failed, true),
                }
            }
        }
    }

    async fn fetch(&self, post_id: u64, with_comments: bool) -> Fetched {
        match self
            .source
            .fetch_post(self.board, post_id, with_comments)
            .await
        {
            Ok(Some(post)) => Fetched::Found(post),
            Ok(None) => {
                tracing::debug!("Post {} deleted or missing. Skipping...", post_id);
                Fetched::Missing
            }
            Err(e) => {
                tracing::warn!("Failed to fetch post {}: {}", post_id, e);
                Fetched::Failed
            }
        }
    }
}
