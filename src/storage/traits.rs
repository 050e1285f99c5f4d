//! Storage traits and error types
//!
//! This module defines the trait interface for record sinks and the
//! associated error types.

use crate::post::PostRecord;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Serialization error for post {post_id}: {source}")]
    Serialization {
        post_id: u64,
        source: serde_json::Error,
    },
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Durable, append-only destination for harvested posts
///
/// Implementations must never truncate or rewrite what earlier calls
/// appended. Records arrive in the order the traversal produced them.
pub trait RecordSink {
    /// Appends a batch of records
    fn append_batch(&mut self, records: &[PostRecord]) -> StorageResult<()>;
}

impl<S: RecordSink + ?Sized> RecordSink for &mut S {
    fn append_batch(&mut self, records: &[PostRecord]) -> StorageResult<()> {
        (**self).append_batch(records)
    }
}
