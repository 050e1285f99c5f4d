//! Storage module for persisting harvested posts
//!
//! This module handles everything that touches the durable store:
//! - The append-only JSONL store
//! - Loading the skip-set of already collected post ids
//! - Batching records in memory before they are flushed

mod batch;
mod dedup;
mod jsonl;
mod traits;

pub use batch::BatchWriter;
pub use dedup::DedupIndex;
pub use jsonl::JsonlStore;
pub use traits::{RecordSink, StorageError, StorageResult};
