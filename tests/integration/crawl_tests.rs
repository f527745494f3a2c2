//! Integration tests for the crawler
//!
//! Most tests drive a full session against a scripted in-memory fetcher.
//! The HTTP fetcher itself is exercised against wiremock servers.

use fossen::config::{CrawlerConfig, FetcherConfig};
use fossen::crawler::{FetchError, HttpFetcher, Rejection};
use fossen::index::{index_channel, run_index_writer};
use fossen::{CrawlState, Crawler, CrawlerHandle, FetchedPage, Indexer, PageFetcher};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Serves canned pages and records every request
#[derive(Default)]
struct ScriptedFetcher {
    pages: HashMap<String, FetchedPage>,
    requests: Arc<Mutex<Vec<String>>>,
    stop_on_request: Arc<Mutex<Option<CrawlerHandle>>>,
}

impl ScriptedFetcher {
    fn page(mut self, url: &str, text: &str, links: &[&str]) -> Self {
        self.pages.insert(
            url.to_string(),
            FetchedPage {
                text: text.to_string(),
                html: format!("<html><body><p>{}</p></body></html>", text),
                title: format!("Page {}", url),
                canonical_url: Url::parse(url).unwrap(),
                links: links.iter().map(|l| Url::parse(l).unwrap()).collect(),
            },
        );
        self
    }

    /// Serves `to`'s page when `from` is requested, as after a redirect
    fn redirect(mut self, from: &str, to: &str) -> Self {
        let target = self.pages[to].clone();
        self.pages.insert(from.to_string(), target);
        self
    }
}

impl PageFetcher for ScriptedFetcher {
    async fn load_page(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        self.requests.lock().unwrap().push(url.to_string());
        if let Some(handle) = self.stop_on_request.lock().unwrap().as_ref() {
            handle.stop();
        }
        self.pages
            .get(url.as_str())
            .cloned()
            .ok_or(FetchError::Status { status_code: 404 })
    }
}

fn create_test_config(start_urls: &[&str]) -> CrawlerConfig {
    CrawlerConfig {
        start_urls: start_urls.iter().map(|s| s.to_string()).collect(),
        page_loading_interval_min: 0,
        page_loading_interval_max: 0,
        ..CrawlerConfig::default()
    }
}

/// Runs a whole session and returns the requests made and the built index
async fn crawl(config: &CrawlerConfig, fetcher: ScriptedFetcher) -> (Vec<String>, Indexer) {
    let requests = fetcher.requests.clone();
    let (sender, receiver) = index_channel();
    let writer = tokio::spawn(run_index_writer(Indexer::new(), receiver));

    let mut crawler = Crawler::new(config, fetcher, sender).with_seed(5);
    crawler.run().await;
    assert_eq!(crawler.state(), CrawlState::Finished);
    drop(crawler);

    let indexer = writer.await.unwrap();
    let requests = requests.lock().unwrap().clone();
    (requests, indexer)
}

#[tokio::test]
async fn test_every_url_fetched_at_most_once() {
    let fetcher = ScriptedFetcher::default()
        .page(
            "https://a.com/",
            "home page alpha",
            &["https://a.com/one", "https://a.com/two", "https://a.com/#top"],
        )
        .page(
            "https://a.com/one",
            "first page beta",
            &["https://a.com/", "https://a.com/two#section", "https://a.com/one"],
        )
        .page("https://a.com/two", "second page gamma", &["https://a.com/one"]);

    let (requests, indexer) = crawl(&create_test_config(&["https://a.com/"]), fetcher).await;

    let mut sorted = requests.clone();
    sorted.sort();
    sorted.dedup();
    assert_eq!(sorted.len(), requests.len(), "duplicate fetch in {:?}", requests);
    assert_eq!(requests.len(), 3);
    assert_eq!(indexer.page_count(), 3);
}

#[tokio::test]
async fn test_redirect_target_fetched_at_most_once() {
    for seed in 0..8 {
        let fetcher = ScriptedFetcher::default()
            .page("https://a.com/new", "moved content", &[])
            .redirect("https://a.com/old", "https://a.com/new");
        let requests = fetcher.requests.clone();
        let config = create_test_config(&["https://a.com/old", "https://a.com/new"]);

        let (sender, _receiver) = index_channel();
        let mut crawler = Crawler::new(&config, fetcher, sender).with_seed(seed);
        crawler.run().await;

        let requests = requests.lock().unwrap();
        let fetches_of_new = requests.iter().filter(|r| *r == "https://a.com/new").count();
        assert!(fetches_of_new <= 1, "seed {}: {:?}", seed, requests);
    }
}

#[tokio::test]
async fn test_zone_limits_crawl() {
    let fetcher = ScriptedFetcher::default()
        .page(
            "https://a.com/blog/",
            "blog index",
            &[
                "https://a.com/blog/post",
                "https://a.com/shop",
                "https://b.com/",
            ],
        )
        .page("https://a.com/blog/post", "blog post", &[])
        .page("https://b.com/", "other site", &[]);
    let config = CrawlerConfig {
        crawling_zones: vec!["https://a.com/blog/".to_string()],
        ..create_test_config(&["https://a.com/blog/"])
    };

    let (requests, _) = crawl(&config, fetcher).await;

    assert!(requests.contains(&"https://a.com/blog/post".to_string()));
    assert!(requests.contains(&"https://b.com/".to_string()));
    assert!(!requests.contains(&"https://a.com/shop".to_string()));
}

#[tokio::test]
async fn test_scheme_and_blacklist_filters() {
    let fetcher = ScriptedFetcher::default().page(
        "https://a.com/",
        "start page",
        &["http://a.com/plain", "https://ads.com/banner", "https://a.com/ok"],
    );
    let config = CrawlerConfig {
        allowed_url_schemes: vec!["https".to_string()],
        blacklisted_hosts: vec!["ads.com".to_string()],
        ..create_test_config(&["https://a.com/"])
    };

    let (sender, _receiver) = index_channel();
    let mut crawler = Crawler::new(&config, fetcher, sender).with_seed(1);
    let stats = crawler.run().await;

    assert_eq!(stats.pages_dispatched, 2);
    assert_eq!(stats.rejections[&Rejection::SchemeNotAllowed], 1);
    assert_eq!(stats.rejections[&Rejection::Blacklisted], 1);
}

#[tokio::test]
async fn test_budget_ends_session() {
    let links: Vec<String> = (0..10).map(|i| format!("https://a.com/{}", i)).collect();
    let link_refs: Vec<&str> = links.iter().map(String::as_str).collect();
    let mut fetcher = ScriptedFetcher::default().page("https://a.com/", "root page", &link_refs);
    for link in &links {
        fetcher = fetcher.page(link, "leaf page", &[]);
    }
    let config = CrawlerConfig {
        pages_per_session: 4,
        ..create_test_config(&["https://a.com/"])
    };

    let (requests, indexer) = crawl(&config, fetcher).await;

    assert_eq!(requests.len(), 4);
    assert_eq!(indexer.page_count(), 4);
}

#[tokio::test]
async fn test_failures_do_not_end_session() {
    let fetcher = ScriptedFetcher::default()
        .page(
            "https://a.com/",
            "root page",
            &["https://a.com/missing", "https://a.com/present"],
        )
        .page("https://a.com/present", "present page", &[]);

    let (requests, indexer) = crawl(&create_test_config(&["https://a.com/"]), fetcher).await;

    assert_eq!(requests.len(), 3);
    assert_eq!(indexer.page_count(), 2);
}

#[tokio::test]
async fn test_result_after_stop_is_discarded() {
    let fetcher = ScriptedFetcher::default().page(
        "https://a.com/",
        "root page",
        &["https://a.com/next"],
    );
    let stop_slot = fetcher.stop_on_request.clone();
    let config = create_test_config(&["https://a.com/"]);

    let (sender, receiver) = index_channel();
    let writer = tokio::spawn(run_index_writer(Indexer::new(), receiver));
    let mut crawler = Crawler::new(&config, fetcher, sender);
    *stop_slot.lock().unwrap() = Some(crawler.handle());

    let stats = crawler.run().await;
    assert_eq!(stats.pages_dispatched, 1);
    assert_eq!(stats.pages_discarded, 1);
    assert_eq!(stats.pages_fetched, 0);
    assert!(crawler.frontier().is_empty());
    drop(crawler);

    let indexer = writer.await.unwrap();
    assert_eq!(indexer.page_count(), 0);
    assert_eq!(indexer.word_count(), 0);
}

#[tokio::test]
async fn test_crawled_pages_are_searchable() {
    let fetcher = ScriptedFetcher::default()
        .page(
            "https://a.com/",
            "rust crawler rust index",
            &["https://a.com/other"],
        )
        .page("https://a.com/other", "rust gardening tips", &[]);

    let (_, indexer) = crawl(&create_test_config(&["https://a.com/"]), fetcher).await;

    let results = indexer.search_ranked(&["rust"]);
    assert_eq!(results.len(), 2);
    // every page has the word, so its idf and every score is zero
    assert!(results.iter().all(|(_, score)| *score == 0.0));

    let results = indexer.search_ranked(&["Crawler"]);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].0.url, "https://a.com/");
    assert!(results[0].1 > 0.0);
}

fn html_response(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html; charset=utf-8")
}

fn test_fetcher() -> HttpFetcher {
    HttpFetcher::new(&FetcherConfig {
        http_user_agent: "FossenTest/1.0".to_string(),
        request_timeout_secs: 5,
    })
    .expect("client builds")
}

#[tokio::test]
async fn test_http_fetcher_loads_html() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/docs/"))
        .respond_with(html_response(
            r#"<html><head><title>Docs</title><script>var hidden = 1;</script></head>
            <body><h1>Welcome</h1><a href="intro">Intro</a>
            <a href="mailto:someone@example.com">Mail</a></body></html>"#,
        ))
        .mount(&mock_server)
        .await;

    let url = Url::parse(&format!("{}/docs/", mock_server.uri())).unwrap();
    let page = test_fetcher().load_page(&url).await.unwrap();

    assert_eq!(page.title, "Docs");
    assert_eq!(page.canonical_url, url);
    assert!(page.text.contains("Welcome"));
    assert!(!page.text.contains("hidden"));
    assert_eq!(
        page.links,
        vec![Url::parse(&format!("{}/docs/intro", mock_server.uri())).unwrap()]
    );
}

#[tokio::test]
async fn test_http_fetcher_reports_status() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let url = Url::parse(&format!("{}/gone", mock_server.uri())).unwrap();
    let err = test_fetcher().load_page(&url).await.unwrap_err();
    assert!(matches!(err, FetchError::Status { status_code: 404 }));
}

#[tokio::test]
async fn test_http_fetcher_rejects_non_html() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/logo.png"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(vec![0x89, 0x50, 0x4e, 0x47])
                .insert_header("content-type", "image/png"),
        )
        .mount(&mock_server)
        .await;

    let url = Url::parse(&format!("{}/logo.png", mock_server.uri())).unwrap();
    let err = test_fetcher().load_page(&url).await.unwrap_err();
    assert!(matches!(err, FetchError::ContentMismatch { .. }));
}

#[tokio::test]
async fn test_http_fetcher_uses_final_url() {
    let mock_server = MockServer::start().await;
    let target = format!("{}/new", mock_server.uri());
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", target.as_str()))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(html_response("<html><body>moved here</body></html>"))
        .mount(&mock_server)
        .await;

    let url = Url::parse(&format!("{}/old", mock_server.uri())).unwrap();
    let page = test_fetcher().load_page(&url).await.unwrap();
    assert_eq!(page.canonical_url.as_str(), target);
}

#[tokio::test]
async fn test_full_crawl_over_http() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_response(&format!(
            r#"<html><head><title>Home</title></head><body>
            <p>lighthouse keepers</p>
            <a href="{0}/page1">Page 1</a>
            <a href="/page2#details">Page 2</a>
            <a href="/missing">Missing</a>
            <a href="https://blocked.example/">Blocked</a>
            </body></html>"#,
            base_url
        )))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/page1"))
        .respond_with(html_response(
            r#"<html><body><p>lighthouse lenses</p><a href="/">Home</a></body></html>"#,
        ))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/page2"))
        .respond_with(html_response(
            r#"<html><body><p>harbour pilots</p><a href="page1">One</a></body></html>"#,
        ))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let config = CrawlerConfig {
        blacklisted_hosts: vec!["blocked.example".to_string()],
        ..create_test_config(&[&format!("{}/", base_url)])
    };

    let (sender, receiver) = index_channel();
    let writer = tokio::spawn(run_index_writer(Indexer::new(), receiver));
    let mut crawler = Crawler::new(&config, test_fetcher(), sender).with_seed(3);
    let stats = crawler.run().await;
    drop(crawler);
    let indexer = writer.await.unwrap();

    assert_eq!(stats.pages_dispatched, 4);
    assert_eq!(stats.pages_fetched, 3);
    assert_eq!(stats.pages_failed, 1);
    assert_eq!(stats.rejections[&Rejection::Blacklisted], 1);
    assert_eq!(indexer.page_count(), 3);

    let results = indexer.search_ranked(&["lighthouse"]);
    assert_eq!(results.len(), 2);
    let results = indexer.search_ranked(&["harbour", "pilots"]);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].0.url, format!("{}/page2", base_url));
}
