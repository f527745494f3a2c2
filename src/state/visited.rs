//! Set of URLs already dispatched for fetching

use crate::hash::UrlHash;
use std::collections::HashSet;

/// URL hashes dispatched during one crawl session
///
/// Owned by a single crawler; nothing is shared between instances.
#[derive(Debug, Clone, Default)]
pub struct VisitedSet {
    hashes: HashSet<UrlHash>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a URL hash as visited
    ///
    /// # Returns
    ///
    /// `true` if the hash was not visited before
    pub fn mark(&mut self, url_hash: UrlHash) -> bool {
        self.hashes.insert(url_hash)
    }

    pub fn contains(&self, url_hash: UrlHash) -> bool {
        self.hashes.contains(&url_hash)
    }

    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }

    pub fn clear(&mut self) {
        self.hashes.clear();
    }
}
