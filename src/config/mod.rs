//! Configuration module for Fossen
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use fossen::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("fossen.toml")).unwrap();
//! println!("Blacklisted hosts: {:?}", config.crawler.blacklisted_hosts);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, FetcherConfig, IndexConfig, PAGE_LOADING_INTERVAL_MAX,
    PAGE_LOADING_INTERVAL_MIN,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_or_default, parse_config};
