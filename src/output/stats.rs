//! Crawl session statistics
//!
//! The crawler keeps a [`CrawlStatistics`] up to date as it runs and hands
//! a copy back when the session ends.

use crate::crawler::Rejection;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Crawl statistics summary
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrawlStatistics {
    /// URLs handed to the fetcher
    pub pages_dispatched: u64,

    /// Pages loaded successfully
    pub pages_fetched: u64,

    /// Pages with words, sent to the index
    pub pages_submitted: u64,

    /// Fetches that failed
    pub pages_failed: u64,

    /// Fetches that completed after the session stopped
    pub pages_discarded: u64,

    /// URLs admitted to the frontier
    pub urls_accepted: u64,

    /// URLs refused, by reason
    pub rejections: BTreeMap<Rejection, u64>,

    /// When the session started
    pub started_at: Option<DateTime<Utc>>,

    /// When the session finished
    pub finished_at: Option<DateTime<Utc>>,
}

impl CrawlStatistics {
    pub fn record_rejection(&mut self, rejection: Rejection) {
        *self.rejections.entry(rejection).or_insert(0) += 1;
    }

    /// Total number of refused URLs
    pub fn total_rejections(&self) -> u64 {
        self.rejections.values().sum()
    }

    /// Session length, once finished
    pub fn duration(&self) -> Option<chrono::Duration> {
        Some(self.finished_at? - self.started_at?)
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Pages dispatched: {}", stats.pages_dispatched);
    println!("  Pages fetched: {}", stats.pages_fetched);
    println!("  Pages sent to index: {}", stats.pages_submitted);
    println!("  Pages failed: {}", stats.pages_failed);
    if stats.pages_discarded > 0 {
        println!("  Pages discarded after stop: {}", stats.pages_discarded);
    }
    println!("  URLs accepted: {}", stats.urls_accepted);
    if let Some(duration) = stats.duration() {
        println!("  Duration: {}s", duration.num_seconds());
    }
    println!();

    if !stats.rejections.is_empty() {
        println!("Rejected URLs ({}):", stats.total_rejections());
        let mut counts: Vec<_> = stats.rejections.iter().collect();
        counts.sort_by(|a, b| b.1.cmp(a.1));

        for (reason, count) in counts {
            println!("  {}: {}", reason, count);
        }
        println!();
    }

    let success_rate = if stats.pages_dispatched > 0 {
        (stats.pages_fetched as f64 / stats.pages_dispatched as f64) * 100.0
    } else {
        0.0
    };

    println!(
        "Success Rate: {:.1}% ({} / {} pages fetched)",
        success_rate, stats.pages_fetched, stats.pages_dispatched
    );
}
