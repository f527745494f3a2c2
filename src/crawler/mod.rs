//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching behind the `PageFetcher` seam
//! - HTML parsing and link extraction
//! - Host, zone and scheme policy
//! - The randomized frontier, pacing and page budget
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod parser;
mod policy;
mod scheduler;

pub use coordinator::{Crawler, CrawlerHandle};
pub use fetcher::{build_http_client, FetchError, FetchedPage, HttpFetcher, PageFetcher};
pub use parser::{parse_html, ParsedPage};
pub use policy::{CrawlPolicy, Rejection};
pub use scheduler::{Frontier, Pacer, PageBudget};
