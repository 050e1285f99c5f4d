//! Statistics generation from the JSONL store
//!
//! This module provides functionality for summarizing what a store holds
//! without touching the network.

use crate::post::{PostRecord, DATE_FORMAT};
use chrono::NaiveDate;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Store statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreStatistics {
    /// Number of well-formed post lines
    pub total_posts: u64,

    /// Lines that could not be read as a post
    pub malformed_lines: u64,

    /// Lowest and highest post id
    pub id_span: Option<(u64, u64)>,

    /// Earliest and latest post date
    pub date_span: Option<(NaiveDate, NaiveDate)>,

    /// Top-level comments across all posts
    pub total_comments: u64,

    /// Replies across all comments
    pub total_replies: u64,

    /// Posts stored without any comment
    pub posts_without_comments: u64,
}

impl StoreStatistics {
    fn add(&mut self, post: &PostRecord) {
        self.total_posts += 1;

        self.id_span = Some(match self.id_span {
            Some((lo, hi)) => (lo.min(post.post_id), hi.max(post.post_id)),
            None => (post.post_id, post.post_id),
        });
        self.date_span = Some(match self.date_span {
            Some((lo, hi)) => (lo.min(post.date), hi.max(post.date)),
            None => (post.date, post.date),
        });

        if post.comments.is_empty() {
            self.posts_without_comments += 1;
        }
        self.total_comments += post.comments.len() as u64;
        self.total_replies += post
            .comments
            .iter()
            .map(|c| c.replies.len() as u64)
            .sum::<u64>();
    }
}

/// Loads statistics from a JSONL store
///
/// # Returns
///
/// * `Ok(StoreStatistics)` - Successfully scanned the store
/// * `Err(std::io::Error)` - The store could not be opened or read
pub fn load_statistics(path: &Path) -> Result<StoreStatistics, std::io::Error> {
    let reader = BufReader::new(File::open(path)?);
    let mut stats = StoreStatistics::default();

    for line in reader.split(b'\n') {
        let line = line?;
        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }
        match serde_json::from_slice::<PostRecord>(&line) {
            Ok(post) => stats.add(&post),
            Err(_) => stats.malformed_lines += 1,
        }
    }

    Ok(stats)
}

/// Prints statistics to stdout in a human-readable format
pub fn print_statistics(stats: &StoreStatistics) {
    println!("=== Store Statistics ===\n");

    println!("Posts: {}", stats.total_posts);
    if stats.malformed_lines > 0 {
        println!("Malformed lines: {}", stats.malformed_lines);
    }

    if let Some((lo, hi)) = stats.id_span {
        println!("Post ids: {} ~ {}", lo, hi);
    }
    if let Some((lo, hi)) = stats.date_span {
        println!(
            "Dates: {} ~ {}",
            lo.format(DATE_FORMAT),
            hi.format(DATE_FORMAT)
        );
    }

    println!("\nComments: {}", stats.total_comments);
    println!("Replies: {}", stats.total_replies);
    println!("Posts without comments: {}", stats.posts_without_comments);
}
