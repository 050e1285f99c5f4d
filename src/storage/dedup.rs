//! Skip-set of post ids already present in the store

use serde::Deserialize;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Only the key is needed to recognise a stored post
#[derive(Deserialize)]
struct StoredId {
    post_id: u64,
}

/// Post ids collected by earlier runs
///
/// Loaded once before the traversal starts and never updated while it runs.
#[derive(Debug, Clone, Default)]
pub struct DedupIndex {
    ids: HashSet<u64>,
}

impl DedupIndex {
    /// Reads every post id from a JSONL store
    ///
    /// Malformed lines are skipped. A missing or unreadable store yields an
    /// empty index so a fresh target can be bootstrapped.
    pub fn load(path: &Path) -> Self {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) => {
                tracing::warn!(
                    "Failed to load collected ids from {}: {}. Starting with an empty index",
                    path.display(),
                    e
                );
                return Self::default();
            }
        };

        let mut ids = HashSet::new();
        let mut skipped = 0usize;
        // Raw bytes so a line with invalid UTF-8 is skipped like any other bad line
        for line in BufReader::new(file).split(b'\n') {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    tracing::warn!("Stopped reading {} early: {}", path.display(), e);
                    break;
                }
            };
            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            match serde_json::from_slice::<StoredId>(&line) {
                Ok(stored) => {
                    ids.insert(stored.post_id);
                }
                Err(_) => skipped += 1,
            }
        }

        if skipped > 0 {
            tracing::warn!("Skipped {} malformed lines in {}", skipped, path.display());
        }
        tracing::info!("Loaded {} collected post ids from {}", ids.len(), path.display());

        Self { ids }
    }

    pub fn contains(&self, post_id: u64) -> bool {
        self.ids.contains(&post_id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl FromIterator<u64> for DedupIndex {
    fn from_iter<I: IntoIterator<Item = u64>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}
