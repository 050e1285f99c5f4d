//! Output module for reporting on harvested data
//!
//! This module handles:
//! - Summarizing the contents of a JSONL store
//! - Printing those statistics for the `--stats` mode

pub mod stats;

pub use stats::{load_statistics, print_statistics, StoreStatistics};
