//! Page fetching
//!
//! This module handles:
//! - The `PageFetcher` seam between the crawl loop and the network
//! - Building HTTP clients from the fetcher configuration
//! - GET requests with content type checks and error classification
//! - Turning a fetched body into text, title and links

use crate::config::FetcherConfig;
use crate::crawler::parser::parse_html;
use reqwest::{header, redirect::Policy, Client};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Maximum redirect hops followed per request
const MAX_REDIRECTS: usize = 10;

/// A successfully loaded page
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedPage {
    /// Visible text of the page
    pub text: String,

    /// Raw markup as served
    pub html: String,

    /// Page title, empty if none
    pub title: String,

    /// URL the page was finally served from
    pub canonical_url: Url,

    /// Outbound links, absolute
    pub links: Vec<Url>,
}

/// Errors that can occur while loading a page
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP status {status_code}")]
    Status { status_code: u16 },

    #[error("Expected HTML, got {content_type:?}")]
    ContentMismatch { content_type: String },

    #[error("Request timed out")]
    Timeout,
}

/// Loads pages for the crawler
///
/// Implementations must not panic on network or content failures; every
/// failure is reported as a [`FetchError`].
pub trait PageFetcher {
    fn load_page(&self, url: &Url) -> impl Future<Output = Result<FetchedPage, FetchError>> + Send;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The fetcher configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```
/// use fossen::config::FetcherConfig;
/// use fossen::crawler::build_http_client;
///
/// let client = build_http_client(&FetcherConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &FetcherConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.http_user_agent.as_str())
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches pages over HTTP(S) and parses them
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher with a client built from `config`
    pub fn new(config: &FetcherConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
        })
    }

    /// Wraps an existing client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(classify_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status_code: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        if !is_html(&content_type) {
            return Err(FetchError::ContentMismatch { content_type });
        }

        let final_url = response.url().clone();
        let html = response.text().await.map_err(classify_error)?;
        let parsed = parse_html(&html, &final_url);

        Ok(FetchedPage {
            text: parsed.text,
            title: parsed.title.unwrap_or_default(),
            canonical_url: final_url,
            links: parsed.links,
            html,
        })
    }
}

impl PageFetcher for HttpFetcher {
    async fn load_page(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        self.fetch(url).await
    }
}

/// Returns true for HTML and XHTML content types
fn is_html(content_type: &str) -> bool {
    let content_type = content_type.to_ascii_lowercase();
    content_type.contains("text/html") || content_type.contains("application/xhtml+xml")
}

fn classify_error(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Http(e)
    }
}
