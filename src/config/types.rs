use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;
use url::Url;

use crate::url::extract_host;

/// Default lower bound of the pause between page loads (milliseconds)
pub const PAGE_LOADING_INTERVAL_MIN: u64 = 1024;

/// Default upper bound of the pause between page loads (milliseconds)
pub const PAGE_LOADING_INTERVAL_MAX: u64 = 4096;

/// Main configuration structure for Fossen
///
/// Every section and field has a default, so an empty file is a valid
/// configuration that crawls nothing and blocks nothing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub fetcher: FetcherConfig,
    pub index: IndexConfig,
}

/// Crawl policy and pacing configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// URLs the frontier is seeded with
    pub start_urls: Vec<String>,

    /// URL schemes that may be crawled; empty allows every scheme
    pub allowed_url_schemes: Vec<String>,

    /// Hostnames that are never crawled
    pub blacklisted_hosts: Vec<String>,

    /// Zone prefixes; each URL restricts its host to the listed prefixes
    pub crawling_zones: Vec<String>,

    /// Lower bound of the pause between page loads (milliseconds)
    pub page_loading_interval_min: u64,

    /// Upper bound of the pause between page loads (milliseconds)
    pub page_loading_interval_max: u64,

    /// Pages to fetch before the session ends; negative means unlimited
    pub pages_per_session: i64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            start_urls: Vec::new(),
            allowed_url_schemes: Vec::new(),
            blacklisted_hosts: Vec::new(),
            crawling_zones: Vec::new(),
            page_loading_interval_min: PAGE_LOADING_INTERVAL_MIN,
            page_loading_interval_max: PAGE_LOADING_INTERVAL_MAX,
            pages_per_session: -1,
        }
    }
}

impl CrawlerConfig {
    /// Builds the zone map: host -> allowed URL prefixes
    ///
    /// Zone URLs that do not parse or have no host are skipped, so an empty
    /// host can never end up in the map. Duplicate prefixes are collapsed.
    pub fn crawling_zones(&self) -> HashMap<String, Vec<String>> {
        let mut zones: HashMap<String, Vec<String>> = HashMap::new();

        for zone in &self.crawling_zones {
            let Ok(zone_url) = Url::parse(zone) else {
                tracing::warn!("Ignoring invalid crawling zone: {}", zone);
                continue;
            };
            let Some(host) = extract_host(&zone_url) else {
                tracing::warn!("Ignoring crawling zone without host: {}", zone);
                continue;
            };

            let prefix = zone_url.to_string();
            let prefixes = zones.entry(host).or_default();
            if !prefixes.contains(&prefix) {
                prefixes.push(prefix);
            }
        }

        zones
    }

    /// Page budget for one session; `None` means unlimited
    pub fn page_budget(&self) -> Option<u64> {
        u64::try_from(self.pages_per_session).ok()
    }
}

/// Page fetcher configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct FetcherConfig {
    /// User agent sent with every request
    pub http_user_agent: String,

    /// Whole-request timeout (seconds)
    pub request_timeout_secs: u64,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            http_user_agent: format!("fossen/{}", env!("CARGO_PKG_VERSION")),
            request_timeout_secs: 30,
        }
    }
}

/// Index persistence configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct IndexConfig {
    /// Directory holding the three index files
    pub database_directory: PathBuf,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            database_directory: PathBuf::from("./fossen_db"),
        }
    }
}
