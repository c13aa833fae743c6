//! Data models
//!
//! Proposals as read from the two sources, and the entries of the feed.

pub mod feed;
pub mod proposal;

// Re-export commonly used types
pub use feed::*;
pub use proposal::*;
