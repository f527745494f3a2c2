//! Word extraction from rendered page text
//!
//! Text is lowercased and split on every run of characters outside the
//! Latin and Cyrillic lowercase alphabets. Tokens shorter than 3 or longer
//! than 32 characters are dropped, as are purely numeric tokens.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeMap;

/// Minimum word length in characters (inclusive)
pub const MIN_WORD_LENGTH: usize = 3;

/// Maximum word length in characters (inclusive)
pub const MAX_WORD_LENGTH: usize = 32;

lazy_static! {
    static ref SEPARATORS: Regex = Regex::new(r"[^a-zа-яё]+").expect("valid regex");
    static ref DIGITS: Regex = Regex::new(r"^[0-9]+$").expect("valid regex");
}

/// Tokenizes `text` into a map of normalized word to occurrence count
///
/// # Examples
///
/// ```
/// use fossen::words::extract_words_and_frequencies;
///
/// let words = extract_words_and_frequencies("The cat, the CAT and a dog.");
/// assert_eq!(words.get("cat"), Some(&2));
/// assert_eq!(words.get("the"), Some(&2));
/// assert!(words.get("a").is_none());
/// ```
pub fn extract_words_and_frequencies(text: &str) -> BTreeMap<String, u64> {
    let lower = text.to_lowercase();
    let mut words = BTreeMap::new();

    for token in SEPARATORS.split(&lower) {
        let length = token.chars().count();
        if !(MIN_WORD_LENGTH..=MAX_WORD_LENGTH).contains(&length) {
            continue;
        }
        if DIGITS.is_match(token) {
            continue;
        }
        *words.entry(token.to_string()).or_insert(0) += 1;
    }

    words
}
