//! URL handling module for Fossen
//!
//! This module provides URL canonicalization, host extraction and the URL
//! identity hash used for dedup.

mod domain;
mod normalize;

use crate::hash::{hash64, UrlHash};
use ::url::Url;

// Re-export main functions
pub use domain::extract_host;
pub use normalize::{canonicalize_url, strip_fragment};

/// Computes the identity hash of a URL
///
/// The fragment is removed first, so `a#x` and `a#y` hash identically.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use fossen::url::url_hash;
///
/// let a = Url::parse("https://example.com/doc#one").unwrap();
/// let b = Url::parse("https://example.com/doc#two").unwrap();
/// assert_eq!(url_hash(&a), url_hash(&b));
/// ```
pub fn url_hash(url: &Url) -> UrlHash {
    if url.fragment().is_some() {
        let canonical = strip_fragment(url.clone());
        hash64(canonical.as_str().as_bytes())
    } else {
        hash64(url.as_str().as_bytes())
    }
}
