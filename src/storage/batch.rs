//! In-memory batching in front of a record sink

use crate::post::PostRecord;
use crate::storage::traits::{RecordSink, StorageResult};

/// Buffers harvested posts and flushes them to a sink in order
pub struct BatchWriter<W: RecordSink> {
    sink: W,
    pending: Vec<PostRecord>,
    threshold: usize,
    flushed: usize,
}

impl<W: RecordSink> BatchWriter<W> {
    /// Creates a writer that flushes once `threshold` posts are pending
    ///
    /// A threshold of zero is treated as one.
    pub fn new(sink: W, threshold: usize) -> Self {
        let threshold = threshold.max(1);
        Self {
            sink,
            pending: Vec::with_capacity(threshold),
            threshold,
            flushed: 0,
        }
    }

    pub fn append(&mut self, record: PostRecord) {
        self.pending.push(record);
    }

    /// Flushes if the pending batch reached the threshold
    ///
    /// Returns the number of records written.
    pub fn flush_if_threshold(&mut self) -> StorageResult<usize> {
        if self.pending.len() >= self.threshold {
            self.flush()
        } else {
            Ok(0)
        }
    }

    /// Flushes whatever is pending; a no-op for an empty batch
    pub fn flush_final(&mut self) -> StorageResult<usize> {
        self.flush()
    }

    fn flush(&mut self) -> StorageResult<usize> {
        if self.pending.is_empty() {
            return Ok(0);
        }
        self.sink.append_batch(&self.pending)?;
        let written = self.pending.len();
        self.pending.clear();
        self.flushed += written;
        Ok(written)
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Total records written through this writer
    pub fn flushed(&self) -> usize {
        self.flushed
    }

    pub fn into_sink(self) -> W {
        self.sink
    }
}
