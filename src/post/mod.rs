//! Post and comment records
//!
//! A [`PostRecord`] is built by one traversal step and serialized to one JSONL
//! line when its batch is flushed. The publish date stays a typed
//! [`NaiveDate`] until serialization.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Textual format of post dates, both on the remote pages and in the store
pub const DATE_FORMAT: &str = "%Y.%m.%d";

/// Parses a `YYYY.MM.DD` date
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), DATE_FORMAT).ok()
}

/// Parses the leading date of a `YYYY.MM.DD HH:MM:SS` timestamp
pub fn parse_timestamp_date(text: &str) -> Option<NaiveDate> {
    text.split_whitespace().next().and_then(parse_date)
}

/// One post harvested from a board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRecord {
    pub post_id: u64,

    #[serde(with = "store_date")]
    pub date: NaiveDate,

    /// Category tag shown before the title; not persisted
    #[serde(skip)]
    pub header: String,

    pub title: String,
    pub view_count: u64,
    pub content: String,
    pub recommend_count: u64,
    pub nonrecommend_count: u64,

    #[serde(default)]
    pub comments: Vec<Comment>,
}

/// A top-level comment and its replies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub text: String,
    #[serde(default)]
    pub replies: Vec<String>,
}

impl Comment {
    /// Builds a comment, dropping empty replies
    ///
    /// Returns `None` when the comment text itself is empty (sticker or
    /// image-only comments carry no text to keep).
    pub fn new(text: impl Into<String>, replies: impl IntoIterator<Item = String>) -> Option<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            return None;
        }
        Some(Self {
            text,
            replies: replies
                .into_iter()
                .filter(|reply| !reply.trim().is_empty())
                .collect(),
        })
    }
}

mod store_date {
    use super::DATE_FORMAT;
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format(DATE_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDate::parse_from_str(&raw, DATE_FORMAT).map_err(serde::de::Error::custom)
    }
}
