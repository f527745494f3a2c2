//! Inverted index engine
//!
//! The [`Indexer`] owns three tables:
//!
//! - a dictionary from word hash to word text
//! - a table of contents from word hash to the content hashes of the pages
//!   containing the word
//! - page metadata, stored once in an arena and reachable by content hash
//!   and by URL hash
//!
//! Pages are only accepted when every word they reference is already in the
//! dictionary, so a page is either fully indexed or not at all. Words and
//! pages are fed in order through [`IndexEvent`]s (see [`run_index_writer`]).

mod events;
mod page;
mod persist;
mod schema;
mod search;

pub use events::{index_channel, run_index_writer, IndexEvent, IndexEventReceiver, IndexEventSender};
pub use page::PageRecord;
pub use persist::{IndexError, PersistReport};
pub use schema::{
    IndexFile, DICTIONARY_FILE, DICTIONARY_VERSION, PAGE_METADATA_FILE, PAGE_METADATA_VERSION,
    TABLE_OF_CONTENTS_FILE, TABLE_OF_CONTENTS_VERSION,
};

use crate::hash::{hash64, ContentHash, UrlHash, WordHash};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// In-memory inverted index with optional on-disk persistence
#[derive(Debug, Clone, Default)]
pub struct Indexer {
    dictionary: HashMap<WordHash, String>,
    table_of_contents: HashMap<WordHash, HashSet<ContentHash>>,
    pages: Vec<PageRecord>,
    by_content: HashMap<ContentHash, usize>,
    by_url: HashMap<UrlHash, usize>,
    database_directory: Option<PathBuf>,
}

impl Indexer {
    /// Creates an empty index with no database directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty index persisted under `directory`
    pub fn with_database_directory(directory: impl Into<PathBuf>) -> Self {
        Self {
            database_directory: Some(directory.into()),
            ..Self::default()
        }
    }

    pub fn set_database_directory(&mut self, directory: impl Into<PathBuf>) {
        self.database_directory = Some(directory.into());
    }

    pub fn database_directory(&self) -> Option<&Path> {
        self.database_directory.as_deref()
    }

    /// Adds a word to the dictionary
    ///
    /// Idempotent; the empty string is ignored.
    ///
    /// # Returns
    ///
    /// `true` if the word was not known before
    pub fn add_word(&mut self, word: &str) -> bool {
        if word.is_empty() {
            return false;
        }

        let hash = hash64(word.as_bytes());
        if self.dictionary.contains_key(&hash) {
            return false;
        }
        self.dictionary.insert(hash, word.to_string());
        true
    }

    /// Inserts a page into the index
    ///
    /// The page is rejected if it is invalid, if its URL or content is
    /// already indexed, or if it references a word hash missing from the
    /// dictionary. A rejected page leaves the index untouched.
    ///
    /// # Returns
    ///
    /// `true` if the page was inserted
    pub fn add_page(&mut self, record: PageRecord) -> bool {
        if !record.is_valid() {
            tracing::debug!("Rejected invalid page record: {}", record.url);
            return false;
        }

        if self.by_url.contains_key(&record.url_hash) {
            tracing::debug!("Rejected already indexed URL: {}", record.url);
            return false;
        }

        if self.by_content.contains_key(&record.content_hash) {
            tracing::debug!("Rejected duplicate content: {}", record.url);
            return false;
        }

        let unknown_word = record
            .word_frequencies
            .iter()
            .any(|(hash, &count)| count > 0 && !self.dictionary.contains_key(hash));
        if unknown_word {
            tracing::debug!("Rejected page referencing unknown words: {}", record.url);
            return false;
        }

        for (hash, &count) in &record.word_frequencies {
            let known = self.dictionary.get(hash).is_some_and(|w| !w.is_empty());
            if count > 0 && known {
                self.table_of_contents
                    .entry(*hash)
                    .or_default()
                    .insert(record.content_hash);
            }
        }

        self.insert_record(record);
        true
    }

    /// Stores a record in the arena and both lookup maps
    fn insert_record(&mut self, record: PageRecord) {
        let slot = self.pages.len();
        self.by_url.insert(record.url_hash, slot);
        self.by_content.insert(record.content_hash, slot);
        self.pages.push(record);
    }

    /// Replaces all page metadata, skipping invalid and duplicate records
    ///
    /// Postings are left untouched.
    fn replace_pages(&mut self, pages: Vec<PageRecord>) {
        self.pages.clear();
        self.by_content.clear();
        self.by_url.clear();

        for record in pages {
            if !record.is_valid()
                || self.by_url.contains_key(&record.url_hash)
                || self.by_content.contains_key(&record.content_hash)
            {
                tracing::warn!("Skipping unusable stored page record: {}", record.url);
                continue;
            }
            self.insert_record(record);
        }
    }

    /// Removes postings that point at pages not in the arena
    ///
    /// Word entries left with no pages are removed too.
    ///
    /// # Returns
    ///
    /// Number of postings removed
    pub(crate) fn prune_postings(&mut self) -> usize {
        let by_content = &self.by_content;
        let mut removed = 0;
        self.table_of_contents.retain(|_, pages| {
            let before = pages.len();
            pages.retain(|hash| by_content.contains_key(hash));
            removed += before - pages.len();
            !pages.is_empty()
        });
        removed
    }

    pub fn page_by_content_hash(&self, content_hash: ContentHash) -> Option<&PageRecord> {
        self.by_content
            .get(&content_hash)
            .and_then(|&slot| self.pages.get(slot))
    }

    pub fn page_by_url_hash(&self, url_hash: UrlHash) -> Option<&PageRecord> {
        self.by_url.get(&url_hash).and_then(|&slot| self.pages.get(slot))
    }

    /// Returns the dictionary text of a word hash
    pub fn word_for_hash(&self, word_hash: WordHash) -> Option<&str> {
        self.dictionary.get(&word_hash).map(String::as_str)
    }

    /// Returns true if the word is in the dictionary
    pub fn contains_word(&self, word: &str) -> bool {
        self.dictionary.contains_key(&hash64(word.as_bytes()))
    }

    /// Number of indexed pages
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Number of dictionary words
    pub fn word_count(&self) -> usize {
        self.dictionary.len()
    }

    /// Iterates over indexed pages in insertion order
    pub fn pages(&self) -> impl Iterator<Item = &PageRecord> {
        self.pages.iter()
    }

    /// Removes every word, posting and page
    ///
    /// The database directory is kept.
    pub fn clear(&mut self) {
        self.dictionary.clear();
        self.table_of_contents.clear();
        self.pages.clear();
        self.by_content.clear();
        self.by_url.clear();
    }

    /// Merges another index into this one
    ///
    /// Dictionaries are unioned first; then every page of `other` whose
    /// content is not yet indexed goes through [`Indexer::add_page`].
    ///
    /// # Returns
    ///
    /// Number of pages taken from `other`
    pub fn merge(&mut self, other: &Indexer) -> usize {
        for (hash, word) in &other.dictionary {
            self.dictionary
                .entry(*hash)
                .or_insert_with(|| word.clone());
        }

        let mut merged = 0;
        for page in &other.pages {
            if self.by_content.contains_key(&page.content_hash) {
                continue;
            }
            if self.add_page(page.clone()) {
                merged += 1;
            }
        }

        tracing::debug!("Merged {} of {} pages", merged, other.page_count());
        merged
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use chrono::{SubsecRound, Utc};

    /// Builds a valid record over the given words
    pub fn record(url: &str, content: &str, words: &[(&str, u64)]) -> PageRecord {
        let word_frequencies: HashMap<WordHash, u64> = words
            .iter()
            .map(|(w, c)| (hash64(w.as_bytes()), *c))
            .collect();
        PageRecord {
            title: format!("Title of {}", url),
            url: url.to_string(),
            url_hash: hash64(url.as_bytes()),
            content_hash: crate::hash::hash128(content.as_bytes()),
            timestamp: Some(Utc::now().trunc_subsecs(3)),
            total_word_count: word_frequencies.values().sum(),
            word_frequencies,
        }
    }

    /// Adds the record's words, then the record
    pub fn index_page(indexer: &mut Indexer, url: &str, content: &str, words: &[(&str, u64)]) {
        for (word, _) in words {
            indexer.add_word(word);
        }
        assert!(indexer.add_page(record(url, content, words)));
    }
}
