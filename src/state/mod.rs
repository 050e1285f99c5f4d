//! State module for tracking traversal progress
//!
//! # Components
//!
//! - `Traversal`: the cursor and walking mode (ascending by id, descending by date, terminated)
//! - `TraversalState`: the bare mode, for logging
//! - `DateWindow`: the inclusive calendar window used by date mode

mod traversal;

// Re-export main types
pub use traversal::{DateWindow, Traversal, TraversalState, WindowPosition};
