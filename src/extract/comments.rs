//! Rendered comment extraction using a Chrome/Chromium browser
//!
//! Comment threads are filled in by JavaScript after the page loads, so they
//! are read from a real browser instead of the plain HTTP response. The
//! browser is lazily launched on first use and must be released with
//! [`BrowserCommentSource::shutdown`].

use crate::board::Board;
use crate::extract::parser::{parse_comments, COMMENTS_READY_SELECTOR};
use crate::extract::CommentSource;
use crate::post::Comment;
use crate::FetchError;
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures_util::StreamExt;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

/// How often the page is polled while waiting for comments
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Browser settings for comment extraction
#[derive(Debug, Clone)]
pub struct BrowserOptions {
    /// Run without a visible window
    pub headless: bool,
    /// Bounded wait for the comment layer, applied before and after the reload
    pub comment_wait: Duration,
    /// Page load timeout
    pub page_timeout: Duration,
}

/// Comment source backed by a lazily launched browser
pub struct BrowserCommentSource {
    options: BrowserOptions,
    browser: Mutex<Option<Browser>>,
}

impl BrowserCommentSource {
    pub fn new(options: BrowserOptions) -> Self {
        Self {
            options,
            browser: Mutex::new(None),
        }
    }

    /// Launches the browser if it is not running yet
    async fn ensure_browser(&self, slot: &mut Option<Browser>) -> Result<(), FetchError> {
        if slot.is_some() {
            return Ok(());
        }

        info!(headless = self.options.headless, "Launching browser for comments");

        let mut builder = BrowserConfig::builder()
            .request_timeout(self.options.page_timeout)
            .no_sandbox()
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-extensions")
            .arg("--mute-audio");
        if !self.options.headless {
            builder = builder.with_head();
        }

        let config = builder
            .build()
            .map_err(|e| FetchError::Browser(format!("Failed to build browser config: {}", e)))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| FetchError::Browser(format!("Failed to launch browser: {}", e)))?;

        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("Browser handler error: {}", e);
                }
            }
        });

        *slot = Some(browser);
        Ok(())
    }

    /// Polls until the comment layer shows a text comment or the wait runs out
    async fn wait_for_comments(&self, page: &Page) -> bool {
        let deadline = Instant::now() + self.options.comment_wait;
        loop {
            if page.find_element(COMMENTS_READY_SELECTOR).await.is_ok() {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn read_comments(&self, page: &Page, post_id: u64) -> Result<Vec<Comment>, FetchError> {
        if !self.wait_for_comments(page).await {
            // Either still loading or the post has no comments; one reload tells them apart
            debug!(post_id, "Comments not rendered yet, reloading");
            page.reload()
                .await
                .map_err(|e| FetchError::Browser(format!("Reload failed: {}", e)))?;
            if !self.wait_for_comments(page).await {
                info!("No comments found in post {}", post_id);
                return Ok(Vec::new());
            }
        }

        let html = page
            .content()
            .await
            .map_err(|e| FetchError::Browser(format!("Failed to read page content: {}", e)))?;
        parse_comments(&html)
    }
}

#[async_trait]
impl CommentSource for BrowserCommentSource {
    async fn fetch_comments(&self, board: &Board, post_id: u64) -> Result<Vec<Comment>, FetchError> {
        let url = board.post_url(post_id)?;

        let mut slot = self.browser.lock().await;
        self.ensure_browser(&mut slot).await?;
        let browser = slot
            .as_ref()
            .ok_or_else(|| FetchError::Browser("Browser not initialized".to_string()))?;

        let page = browser
            .new_page(url.as_str())
            .await
            .map_err(|e| FetchError::Browser(format!("Failed to open {}: {}", url, e)))?;

        let result = self.read_comments(&page, post_id).await;

        if let Err(e) = page.close().await {
            warn!("Failed to close page: {}", e);
        }

        result
    }

    async fn shutdown(&self) {
        let mut slot = self.browser.lock().await;
        if let Some(mut browser) = slot.take() {
            if let Err(e) = browser.close().await {
                error!("Failed to close browser: {}", e);
            } else {
                info!("Browser shutdown complete");
            }
        }
    }
}
