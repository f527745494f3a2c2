//! Host, zone and scheme rules deciding which URLs may be crawled

use crate::config::CrawlerConfig;
use crate::url::extract_host;
use std::collections::{HashMap, HashSet};
use std::fmt;
use url::Url;

/// Why a URL was not added to the frontier
///
/// Rejections are ordinary control flow, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Rejection {
    /// Host is on the blacklist
    Blacklisted,

    /// URL was already dispatched this session
    AlreadyVisited,

    /// Host is zone-restricted and the URL matches none of its prefixes
    OutsideZone,

    /// Scheme is not in the allowed list
    SchemeNotAllowed,

    /// URL is already waiting in the frontier
    AlreadyQueued,
}

impl Rejection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blacklisted => "blacklisted",
            Self::AlreadyVisited => "already_visited",
            Self::OutsideZone => "outside_zone",
            Self::SchemeNotAllowed => "scheme_not_allowed",
            Self::AlreadyQueued => "already_queued",
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Static crawl rules, fixed for the length of a session
#[derive(Debug, Clone, Default)]
pub struct CrawlPolicy {
    blacklisted_hosts: HashSet<String>,

    /// Host -> allowed URL prefixes
    crawling_zones: HashMap<String, Vec<String>>,

    /// Empty means every scheme is allowed
    allowed_schemes: Vec<String>,
}

impl CrawlPolicy {
    /// Creates a policy from explicit rules
    ///
    /// Hosts and schemes are lowercased; an empty host never becomes a zone
    /// key, so a blank entry cannot restrict or open anything.
    pub fn new(
        blacklisted_hosts: impl IntoIterator<Item = String>,
        crawling_zones: HashMap<String, Vec<String>>,
        allowed_schemes: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            blacklisted_hosts: blacklisted_hosts
                .into_iter()
                .map(|h| h.to_lowercase())
                .filter(|h| !h.is_empty())
                .collect(),
            crawling_zones: crawling_zones
                .into_iter()
                .map(|(host, prefixes)| (host.to_lowercase(), prefixes))
                .filter(|(host, _)| !host.is_empty())
                .collect(),
            allowed_schemes: allowed_schemes
                .into_iter()
                .map(|s| s.to_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    /// Builds the policy described by the crawler configuration
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self::new(
            config.blacklisted_hosts.iter().cloned(),
            config.crawling_zones(),
            config.allowed_url_schemes.iter().cloned(),
        )
    }

    /// Returns true if the URL's host is blacklisted
    pub fn is_blacklisted(&self, url: &Url) -> bool {
        extract_host(url).is_some_and(|host| self.blacklisted_hosts.contains(&host))
    }

    /// Returns true if the URL is inside its host's crawling zone
    ///
    /// Hosts without zone entries are open. For restricted hosts the
    /// fragment-free URL string must start with one of the prefixes.
    pub fn in_zone(&self, url: &Url) -> bool {
        let Some(host) = extract_host(url) else {
            return true;
        };
        let Some(prefixes) = self.crawling_zones.get(&host) else {
            return true;
        };

        let mut canonical = url.clone();
        canonical.set_fragment(None);
        prefixes
            .iter()
            .any(|prefix| canonical.as_str().starts_with(prefix.as_str()))
    }

    /// Returns true if the URL's scheme may be crawled
    pub fn scheme_allowed(&self, url: &Url) -> bool {
        self.allowed_schemes.is_empty() || self.allowed_schemes.iter().any(|s| s == url.scheme())
    }
}
