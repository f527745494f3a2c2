//! Boolean AND search and TF-IDF ranking

use super::{Indexer, PageRecord};
use crate::hash::{hash64, ContentHash, WordHash};
use std::collections::HashSet;

/// Hash of a query word, lowercased
fn query_hash(word: &str) -> WordHash {
    hash64(word.to_lowercase().as_bytes())
}

impl Indexer {
    /// Returns the pages containing every one of `words`
    ///
    /// Query words are lowercased. An empty query, or any word missing from
    /// the index, yields no pages. Result order is unspecified; use
    /// [`Indexer::sort_pages_by_tf_idf_score`] to rank.
    pub fn search_pages_by_words<S: AsRef<str>>(&self, words: &[S]) -> Vec<&PageRecord> {
        if words.is_empty() {
            return Vec::new();
        }

        let mut postings: Vec<&HashSet<ContentHash>> = Vec::with_capacity(words.len());
        for word in words {
            match self.table_of_contents.get(&query_hash(word.as_ref())) {
                Some(set) => postings.push(set),
                None => return Vec::new(),
            }
        }

        let Some((smallest, _)) = postings
            .iter()
            .enumerate()
            .min_by_key(|(_, set)| set.len())
        else {
            return Vec::new();
        };

        let mut matches: HashSet<ContentHash> = postings[smallest].clone();
        for (i, set) in postings.iter().enumerate() {
            if i == smallest {
                continue;
            }
            matches.retain(|hash| set.contains(hash));
            if matches.is_empty() {
                return Vec::new();
            }
        }

        matches
            .into_iter()
            .filter_map(|hash| self.page_by_content_hash(hash))
            .collect()
    }

    /// TF-IDF score of one word for a page
    ///
    /// `tf = frequency / total_word_count` and
    /// `idf = ln(page_count / document_frequency)`. Zero when the page is
    /// not in this index, has no words, does not contain the word, or the
    /// word has no postings.
    pub fn tf_idf_score(&self, page: &PageRecord, word: &str) -> f64 {
        if page.total_word_count == 0 || !self.by_content.contains_key(&page.content_hash) {
            return 0.0;
        }

        let hash = query_hash(word);
        let frequency = page.frequency(hash);
        if frequency == 0 {
            return 0.0;
        }

        let document_frequency = match self.table_of_contents.get(&hash) {
            Some(set) if !set.is_empty() => set.len(),
            _ => return 0.0,
        };

        let tf = frequency as f64 / page.total_word_count as f64;
        let idf = (self.page_count() as f64 / document_frequency as f64).ln();
        tf * idf
    }

    /// Sum of the per-word TF-IDF scores
    pub fn tf_idf_score_words<S: AsRef<str>>(&self, page: &PageRecord, words: &[S]) -> f64 {
        words
            .iter()
            .map(|word| self.tf_idf_score(page, word.as_ref()))
            .sum()
    }

    /// TF-IDF score of one word for the page with the given content hash
    ///
    /// Zero if no such page is indexed.
    pub fn tf_idf_score_by_content_hash(&self, content_hash: ContentHash, word: &str) -> f64 {
        self.page_by_content_hash(content_hash)
            .map_or(0.0, |page| self.tf_idf_score(page, word))
    }

    /// Summed TF-IDF score for the page with the given content hash
    pub fn tf_idf_score_words_by_content_hash<S: AsRef<str>>(
        &self,
        content_hash: ContentHash,
        words: &[S],
    ) -> f64 {
        self.page_by_content_hash(content_hash)
            .map_or(0.0, |page| self.tf_idf_score_words(page, words))
    }

    /// Sorts pages by descending summed TF-IDF score
    ///
    /// The sort is stable: pages with equal scores keep their input order.
    pub fn sort_pages_by_tf_idf_score<'a, S: AsRef<str>>(
        &self,
        pages: &mut [&'a PageRecord],
        words: &[S],
    ) {
        if pages.len() < 2 || words.is_empty() {
            return;
        }

        let mut scored: Vec<(f64, &'a PageRecord)> = pages
            .iter()
            .map(|&page| (self.tf_idf_score_words(page, words), page))
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));

        for (slot, (_, page)) in pages.iter_mut().zip(scored) {
            *slot = page;
        }
    }

    /// Searches and ranks in one step
    ///
    /// # Returns
    ///
    /// Matching pages with their scores, best first
    pub fn search_ranked<S: AsRef<str>>(&self, words: &[S]) -> Vec<(&PageRecord, f64)> {
        let mut pages = self.search_pages_by_words(words);
        // sort by URL first so equal scores come out in a reproducible order
        pages.sort_by(|a, b| a.url.cmp(&b.url));
        self.sort_pages_by_tf_idf_score(&mut pages, words);

        pages
            .into_iter()
            .map(|page| (page, self.tf_idf_score_words(page, words)))
            .collect()
    }
}
