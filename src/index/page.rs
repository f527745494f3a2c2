//! Page metadata stored by the indexer

use crate::hash::{hash128, hash64, ContentHash, UrlHash, WordHash};
use crate::url::url_hash;
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use url::Url;

/// Metadata for one indexed page
///
/// Words are stored as hashes; their text lives once in the indexer's
/// dictionary. Field order is the on-disk order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PageRecord {
    /// Page title, possibly empty
    pub title: String,

    /// Canonical URL (fragment stripped)
    pub url: String,

    /// Hash of the canonical URL
    pub url_hash: UrlHash,

    /// Hash of the raw page content
    pub content_hash: ContentHash,

    /// Capture time, millisecond precision
    #[serde(with = "timestamp_millis")]
    pub timestamp: Option<DateTime<Utc>>,

    /// Word hash -> occurrences within this page
    pub word_frequencies: HashMap<WordHash, u64>,

    /// Sum of all frequencies
    pub total_word_count: u64,
}

impl PageRecord {
    /// Builds a record for a freshly fetched page
    ///
    /// # Arguments
    ///
    /// * `canonical_url` - URL the page was served from; its fragment is ignored
    /// * `title` - Page title
    /// * `html` - Raw page markup, hashed for content identity
    /// * `words` - Word -> count map from the page text
    pub fn from_page(
        canonical_url: &Url,
        title: &str,
        html: &str,
        words: &BTreeMap<String, u64>,
    ) -> Self {
        let mut canonical = canonical_url.clone();
        canonical.set_fragment(None);

        let word_frequencies: HashMap<WordHash, u64> = words
            .iter()
            .filter(|(_, &count)| count > 0)
            .map(|(word, &count)| (hash64(word.as_bytes()), count))
            .collect();
        let total_word_count = word_frequencies.values().sum();

        Self {
            title: title.to_string(),
            url_hash: url_hash(&canonical),
            url: canonical.into(),
            content_hash: hash128(html.as_bytes()),
            timestamp: Some(Utc::now().trunc_subsecs(3)),
            word_frequencies,
            total_word_count,
        }
    }

    /// Returns true if the record may be inserted into an index
    pub fn is_valid(&self) -> bool {
        self.url_hash != 0
            && self.content_hash != 0
            && self.total_word_count > 0
            && !self.word_frequencies.is_empty()
            && !self.url.is_empty()
            && self.timestamp.is_some()
    }

    /// Occurrences of the word with the given hash
    pub fn frequency(&self, word_hash: WordHash) -> u64 {
        self.word_frequencies.get(&word_hash).copied().unwrap_or(0)
    }
}

/// Serializes an optional timestamp as i64 Unix milliseconds
mod timestamp_millis {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    const ABSENT: i64 = i64::MIN;

    pub fn serialize<S: Serializer>(
        timestamp: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(timestamp.map_or(ABSENT, |t| t.timestamp_millis()))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        let millis = i64::deserialize(deserializer)?;
        if millis == ABSENT {
            return Ok(None);
        }
        Ok(DateTime::<Utc>::from_timestamp_millis(millis))
    }
}
