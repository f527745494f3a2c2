use crate::config::types::{Config, CrawlerConfig, FetcherConfig};
use crate::ConfigError;
use url::Url;

/// Validates and normalizes the entire configuration
///
/// Hard errors are reserved for values that cannot mean anything (an
/// unparseable start URL). Everything else is normalized in place: blank
/// entries are dropped, duplicates collapsed, and swapped interval bounds
/// put back in order.
pub fn validate(config: &mut Config) -> Result<(), ConfigError> {
    validate_crawler_config(&mut config.crawler)?;
    validate_fetcher_config(&config.fetcher)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &mut CrawlerConfig) -> Result<(), ConfigError> {
    config.allowed_url_schemes = dedup_non_empty(
        config
            .allowed_url_schemes
            .iter()
            .map(|s| s.trim().to_lowercase()),
    );
    config.blacklisted_hosts = dedup_non_empty(
        config
            .blacklisted_hosts
            .iter()
            .map(|h| h.trim().to_lowercase()),
    );
    config.start_urls = dedup_non_empty(config.start_urls.iter().map(|u| u.trim().to_string()));
    config.crawling_zones =
        dedup_non_empty(config.crawling_zones.iter().map(|z| z.trim().to_string()));

    for start_url in &config.start_urls {
        Url::parse(start_url).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid start URL '{}': {}", start_url, e))
        })?;
    }

    for zone in &config.crawling_zones {
        let url = Url::parse(zone).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid crawling zone '{}': {}", zone, e))
        })?;
        if url.host_str().map_or(true, str::is_empty) {
            return Err(ConfigError::InvalidUrl(format!(
                "Crawling zone '{}' has no host",
                zone
            )));
        }
    }

    if config.page_loading_interval_min > config.page_loading_interval_max {
        tracing::warn!(
            "page-loading-interval-min ({}) exceeds max ({}); swapping",
            config.page_loading_interval_min,
            config.page_loading_interval_max
        );
        std::mem::swap(
            &mut config.page_loading_interval_min,
            &mut config.page_loading_interval_max,
        );
    }

    Ok(())
}

/// Validates fetcher configuration
fn validate_fetcher_config(config: &FetcherConfig) -> Result<(), ConfigError> {
    if config.http_user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "http-user-agent cannot be empty".to_string(),
        ));
    }

    if config.request_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "request-timeout-secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Keeps the first occurrence of every non-empty entry, preserving order
fn dedup_non_empty(entries: impl Iterator<Item = String>) -> Vec<String> {
    let mut kept: Vec<String> = Vec::new();
    for entry in entries {
        if !entry.is_empty() && !kept.contains(&entry) {
            kept.push(entry);
        }
    }
    kept
}
