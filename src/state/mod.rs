//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlState`: Where a crawl session is in its fetch cycle
//! - `VisitedSet`: URL hashes already dispatched in the current session

mod crawl_state;
mod visited;

// Re-export main types
pub use crawl_state::CrawlState;
pub use visited::VisitedSet;
