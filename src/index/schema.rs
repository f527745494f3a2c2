//! On-disk layout of the index files
//!
//! Every file starts with a little-endian `u64` format version followed by a
//! bincode (fixed-width integers, `u64` length prefixes) body:
//!
//! - `index_dlt.dat`: `count`, then `(word_hash: u64, word: string)` pairs
//! - `index_toc.dat`: map of `word_hash: u64` to sets of `content_hash: u128`
//! - `index_md.dat`: `page_count: u64`, then that many page records

use bincode::Options;
use std::fmt;

/// Dictionary file name
pub const DICTIONARY_FILE: &str = "index_dlt.dat";

/// Table of contents file name
pub const TABLE_OF_CONTENTS_FILE: &str = "index_toc.dat";

/// Page metadata file name
pub const PAGE_METADATA_FILE: &str = "index_md.dat";

/// Current dictionary format version
pub const DICTIONARY_VERSION: u64 = 1;

/// Current table of contents format version
pub const TABLE_OF_CONTENTS_VERSION: u64 = 1;

/// Current page metadata format version
pub const PAGE_METADATA_VERSION: u64 = 1;

/// The three independently versioned index files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexFile {
    Dictionary,
    TableOfContents,
    PageMetadata,
}

impl IndexFile {
    /// All files, in save/load order
    pub const ALL: [IndexFile; 3] = [
        IndexFile::Dictionary,
        IndexFile::TableOfContents,
        IndexFile::PageMetadata,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            IndexFile::Dictionary => DICTIONARY_FILE,
            IndexFile::TableOfContents => TABLE_OF_CONTENTS_FILE,
            IndexFile::PageMetadata => PAGE_METADATA_FILE,
        }
    }

    pub fn version(self) -> u64 {
        match self {
            IndexFile::Dictionary => DICTIONARY_VERSION,
            IndexFile::TableOfContents => TABLE_OF_CONTENTS_VERSION,
            IndexFile::PageMetadata => PAGE_METADATA_VERSION,
        }
    }
}

impl fmt::Display for IndexFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

/// Decoder options matching `bincode::serialize`, bounded by the file size
///
/// The limit makes a corrupted length prefix fail with an error instead of
/// attempting a huge allocation.
pub(crate) fn decoder(limit: u64) -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .allow_trailing_bytes()
        .with_limit(limit)
}
