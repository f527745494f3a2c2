//! Frontier, pacing and page budget for a crawl session
//!
//! This module handles:
//! - The two-list URL frontier with randomized draining
//! - Random delays between page loads
//! - Counting pages against the per-session budget

use crate::hash::UrlHash;
use crate::url::url_hash;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use std::time::Duration;
use url::Url;

/// URLs waiting to be fetched
///
/// New URLs go to `queued`. URLs are drawn at random from `active`; when
/// `active` runs dry the two lists swap. Every URL is in at most one list,
/// at most once.
#[derive(Debug)]
pub struct Frontier {
    /// URLs drained during the current cycle
    active: Vec<Url>,

    /// URLs discovered for the next cycle
    queued: Vec<Url>,

    /// Hashes of every URL in either list
    pending: HashSet<UrlHash>,

    rng: StdRng,
}

impl Default for Frontier {
    fn default() -> Self {
        Self::new()
    }
}

impl Frontier {
    /// Creates an empty frontier with an entropy-seeded random source
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Creates an empty frontier with a fixed seed, for reproducible order
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            active: Vec::new(),
            queued: Vec::new(),
            pending: HashSet::new(),
            rng,
        }
    }

    /// Returns true if a URL with this hash is waiting
    pub fn contains(&self, url_hash: UrlHash) -> bool {
        self.pending.contains(&url_hash)
    }

    /// Appends a URL to the queued list
    ///
    /// The URL should already be fragment-free.
    ///
    /// # Returns
    ///
    /// `false` if the URL is already waiting
    pub fn push(&mut self, url: Url) -> bool {
        if !self.pending.insert(url_hash(&url)) {
            return false;
        }
        self.queued.push(url);
        true
    }

    /// Removes and returns a random URL
    ///
    /// Swaps the lists first if `active` is empty. Returns `None` once both
    /// lists are empty.
    pub fn dequeue_next(&mut self) -> Option<Url> {
        if self.active.is_empty() {
            std::mem::swap(&mut self.active, &mut self.queued);
            if !self.active.is_empty() {
                tracing::debug!("Starting new frontier cycle with {} URLs", self.active.len());
            }
        }

        if self.active.is_empty() {
            return None;
        }

        let index = self.rng.gen_range(0..self.active.len());
        let url = self.active.swap_remove(index);
        self.pending.remove(&url_hash(&url));
        Some(url)
    }

    /// Removes the URL with this hash from whichever list holds it
    ///
    /// # Returns
    ///
    /// `false` if no such URL was waiting
    pub fn remove(&mut self, hash: UrlHash) -> bool {
        if !self.pending.remove(&hash) {
            return false;
        }
        self.active.retain(|url| url_hash(url) != hash);
        self.queued.retain(|url| url_hash(url) != hash);
        true
    }

    /// Number of waiting URLs
    pub fn len(&self) -> usize {
        self.active.len() + self.queued.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty() && self.queued.is_empty()
    }

    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    pub fn queued_len(&self) -> usize {
        self.queued.len()
    }

    /// Drops every waiting URL
    pub fn clear(&mut self) {
        self.active.clear();
        self.queued.clear();
        self.pending.clear();
    }
}

/// Draws the pause before each page load
#[derive(Debug)]
pub struct Pacer {
    min_ms: u64,
    max_ms: u64,
    rng: StdRng,
}

impl Pacer {
    /// Creates a pacer drawing from `[min_ms, max_ms]`
    ///
    /// Bounds given in the wrong order are swapped.
    pub fn new(min_ms: u64, max_ms: u64) -> Self {
        Self::with_rng(min_ms, max_ms, StdRng::from_entropy())
    }

    pub fn with_seed(min_ms: u64, max_ms: u64, seed: u64) -> Self {
        Self::with_rng(min_ms, max_ms, StdRng::seed_from_u64(seed))
    }

    fn with_rng(min_ms: u64, max_ms: u64, rng: StdRng) -> Self {
        let (min_ms, max_ms) = if min_ms > max_ms {
            (max_ms, min_ms)
        } else {
            (min_ms, max_ms)
        };
        Self { min_ms, max_ms, rng }
    }

    /// Returns the next delay, uniformly distributed over the bounds
    pub fn next_delay(&mut self) -> Duration {
        if self.min_ms == self.max_ms {
            return Duration::from_millis(self.min_ms);
        }
        Duration::from_millis(self.rng.gen_range(self.min_ms..=self.max_ms))
    }

    pub fn bounds(&self) -> (u64, u64) {
        (self.min_ms, self.max_ms)
    }
}

/// Remaining successful page loads allowed in a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageBudget {
    remaining: Option<u64>,
}

impl PageBudget {
    /// Creates a budget; `None` means unlimited
    pub fn new(limit: Option<u64>) -> Self {
        Self { remaining: limit }
    }

    pub fn unlimited() -> Self {
        Self { remaining: None }
    }

    /// Counts one page against the budget
    ///
    /// # Returns
    ///
    /// `true` if the budget is now spent
    pub fn consume(&mut self) -> bool {
        if let Some(remaining) = self.remaining.as_mut() {
            *remaining = remaining.saturating_sub(1);
        }
        self.is_exhausted()
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining == Some(0)
    }

    pub fn remaining(&self) -> Option<u64> {
        self.remaining
    }
}
