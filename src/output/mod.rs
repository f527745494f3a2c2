//! Output module for reporting crawl sessions and search results
//!
//! This module handles:
//! - Crawl session statistics
//! - Ranked search result listings
//! - Index summaries

pub mod stats;

pub use stats::{print_statistics, CrawlStatistics};

use crate::index::{Indexer, PageRecord};

/// Prints ranked search results to stdout
///
/// # Arguments
///
/// * `query` - The words that were searched for
/// * `results` - Pages with their scores, best first
pub fn print_search_results<S: AsRef<str>>(query: &[S], results: &[(&PageRecord, f64)]) {
    let query: Vec<&str> = query.iter().map(|w| w.as_ref()).collect();
    println!("=== Search: {} ===\n", query.join(" "));

    if results.is_empty() {
        println!("No pages contain every word.");
        return;
    }

    for (rank, (page, score)) in results.iter().enumerate() {
        let title = if page.title.is_empty() {
            "(untitled)"
        } else {
            page.title.as_str()
        };
        println!("{:>3}. {} [{:.4}]", rank + 1, title, score);
        println!("     {}", page.url);
    }

    println!("\n{} page(s) found", results.len());
}

/// Prints the size of an index to stdout
pub fn print_index_summary(indexer: &Indexer) {
    println!("=== Index ===\n");
    if let Some(directory) = indexer.database_directory() {
        println!("  Directory: {}", directory.display());
    }
    println!("  Words: {}", indexer.word_count());
    println!("  Pages: {}", indexer.page_count());

    let newest = indexer.pages().filter_map(|p| p.timestamp).max();
    if let Some(newest) = newest {
        println!("  Newest page: {}", newest.to_rfc3339());
    }
}
