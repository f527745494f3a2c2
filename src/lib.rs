//! Fossen: a single-frontier web crawler with a TF-IDF full-text index
//!
//! This crate crawls pages reachable from a set of start URLs, subject to
//! host, zone and scheme policy, and builds an inverted index over the
//! crawled text that can be searched and persisted to disk.

pub mod config;
pub mod crawler;
pub mod hash;
pub mod index;
pub mod output;
pub mod state;
pub mod url;
pub mod words;

use thiserror::Error;

/// Main error type for Fossen operations
#[derive(Debug, Error)]
pub enum FossenError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Index error: {0}")]
    Index(#[from] index::IndexError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] crawler::FetchError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),
}

/// Result type alias for Fossen operations
pub type Result<T> = std::result::Result<T, FossenError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Crawler, CrawlerHandle, FetchedPage, PageFetcher};
pub use hash::{hash128, hash64, ContentHash, UrlHash, WordHash};
pub use index::{IndexEvent, Indexer, PageRecord};
pub use state::{CrawlState, VisitedSet};
pub use crate::url::{canonicalize_url, extract_host, url_hash};
pub use words::extract_words_and_frequencies;
