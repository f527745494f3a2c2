use url::Url;

/// Extracts the host from a URL
///
/// Hosts come back lowercase from the URL parser for special schemes; the
/// explicit lowercase keeps lookups in the blacklist and zone map exact for
/// any scheme. URLs without a host (`mailto:`, `data:`) yield `None`.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use fossen::url::extract_host;
///
/// let url = Url::parse("https://blog.example.com/path").unwrap();
/// assert_eq!(extract_host(&url), Some("blog.example.com".to_string()));
///
/// let url = Url::parse("mailto:someone@example.com").unwrap();
/// assert_eq!(extract_host(&url), None);
/// ```
pub fn extract_host(url: &Url) -> Option<String> {
    url.host_str()
        .filter(|h| !h.is_empty())
        .map(|h| h.to_lowercase())
}
