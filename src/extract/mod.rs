//! Extraction adapters for posts, listings, and comments
//!
//! The traversal engine only sees the traits defined here:
//! - [`PostSource`] fetches one post, optionally with its comment thread
//! - [`BoardIndex`] answers board existence and newest-post queries
//! - [`CommentSource`] reads a rendered comment thread
//!
//! [`BoardClient`] implements the first two over plain HTTP and delegates
//! comments to any [`CommentSource`], normally [`BrowserCommentSource`].

mod comments;
mod fetcher;
mod parser;

pub use comments::{BrowserCommentSource, BrowserOptions};
pub use fetcher::{build_http_client, fetch_page, PageFetch};
pub use parser::{parse_comments, parse_post_page, parse_recent_post_id};

use crate::board::Board;
use crate::post::{Comment, PostRecord};
use crate::FetchError;
use async_trait::async_trait;
use reqwest::Client;

/// Fetches single posts
#[async_trait]
pub trait PostSource: Send + Sync {
    /// Fetches one post
    ///
    /// # Returns
    ///
    /// * `Ok(Some(PostRecord))` - The post exists
    /// * `Ok(None)` - The post was deleted or never existed
    /// * `Err(FetchError)` - Transport or extraction failure
    async fn fetch_post(
        &self,
        board: &Board,
        post_id: u64,
        with_comments: bool,
    ) -> Result<Option<PostRecord>, FetchError>;
}

/// Board-level lookups used once before a traversal starts
#[async_trait]
pub trait BoardIndex: Send + Sync {
    /// Whether the board's listing endpoint exists
    async fn board_exists(&self, board: &Board) -> Result<bool, FetchError>;

    /// Newest regular (non-notice) post id listed on the board, if any
    async fn fetch_recent_post_id(&self, board: &Board) -> Result<Option<u64>, FetchError>;
}

/// Reads comment threads that are rendered client-side
#[async_trait]
pub trait CommentSource: Send + Sync {
    async fn fetch_comments(&self, board: &Board, post_id: u64) -> Result<Vec<Comment>, FetchError>;

    /// Releases any resource held by the source
    async fn shutdown(&self) {}
}

/// HTTP adapter for post pages and listings
pub struct BoardClient<C: CommentSource> {
    client: Client,
    comments: C,
}

impl<C: CommentSource> BoardClient<C> {
    pub fn new(client: Client, comments: C) -> Self {
        Self { client, comments }
    }

    /// Releases the comment source
    pub async fn shutdown(&self) {
        self.comments.shutdown().await;
    }
}

#[async_trait]
impl<C: CommentSource> PostSource for BoardClient<C> {
    async fn fetch_post(
        &self,
        board: &Board,
        post_id: u64,
        with_comments: bool,
    ) -> Result<Option<PostRecord>, FetchError> {
        let url = board.post_url(post_id)?;

        let body = match fetch_page(&self.client, &url).await? {
            PageFetch::Page { body } => body,
            PageFetch::NotFound => return Ok(None),
        };

        let Some(mut post) = parse_post_page(&body, post_id)? else {
            return Ok(None);
        };

        if with_comments {
            post.comments = self.comments.fetch_comments(board, post_id).await?;
        }

        Ok(Some(post))
    }
}

#[async_trait]
impl<C: CommentSource> BoardIndex for BoardClient<C> {
    async fn board_exists(&self, board: &Board) -> Result<bool, FetchError> {
        let url = board.listing_url()?;
        match fetch_page(&self.client, &url).await {
            Ok(PageFetch::Page { .. }) => Ok(true),
            Ok(PageFetch::NotFound) => Ok(false),
            // Only a 404 means the board is gone
            Err(FetchError::Status { .. }) => Ok(true),
            Err(e) => Err(e),
        }
    }

    async fn fetch_recent_post_id(&self, board: &Board) -> Result<Option<u64>, FetchError> {
        let url = board.listing_url()?;
        match fetch_page(&self.client, &url).await? {
            PageFetch::Page { body } => parse_recent_post_id(&body),
            PageFetch::NotFound => Ok(None),
        }
    }
}
