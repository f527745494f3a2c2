use crate::UrlError;
use url::Url;

/// Produces the canonical form of a URL: the parsed URL with its fragment removed
///
/// Canonical URLs are the identity key for dedup, so two links that differ
/// only after `#` refer to the same page. Nothing else is rewritten: scheme,
/// host case (already lowercased by the URL parser), path and query are kept
/// as the parser serializes them.
///
/// # Examples
///
/// ```
/// use fossen::url::canonicalize_url;
///
/// let url = canonicalize_url("https://Example.com/docs#install").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/docs");
/// ```
pub fn canonicalize_url(url_str: &str) -> Result<Url, UrlError> {
    let url = Url::parse(url_str).map_err(|e| UrlError::Parse(format!("{}: {}", url_str, e)))?;
    Ok(strip_fragment(url))
}

/// Removes the fragment from an already parsed URL
pub fn strip_fragment(mut url: Url) -> Url {
    url.set_fragment(None);
    url
}
