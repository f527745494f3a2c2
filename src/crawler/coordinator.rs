//! Crawler coordinator - main crawl orchestration logic
//!
//! One [`Crawler`] runs one session: a single loop that waits out a random
//! delay, dispatches one URL, and turns the fetched page into index events
//! and new frontier entries. At most one fetch is in flight at a time, and
//! only the loop itself touches the frontier.

use crate::config::CrawlerConfig;
use crate::crawler::fetcher::{FetchError, FetchedPage, PageFetcher};
use crate::crawler::policy::{CrawlPolicy, Rejection};
use crate::crawler::scheduler::{Frontier, PageBudget, Pacer};
use crate::hash::{hash64, WordHash};
use crate::index::{IndexEvent, IndexEventSender, PageRecord};
use crate::output::CrawlStatistics;
use crate::state::{CrawlState, VisitedSet};
use crate::url::{canonicalize_url, strip_fragment, url_hash};
use crate::words::extract_words_and_frequencies;
use chrono::Utc;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use url::Url;

#[derive(Debug, Default)]
struct StopSignal {
    stopped: AtomicBool,
    notify: Notify,
}

/// Cloneable handle for stopping a running crawler from another task
///
/// # Example
///
/// ```no_run
/// # async fn example(mut crawler: fossen::Crawler<fossen::crawler::HttpFetcher>) {
/// let handle = crawler.handle();
/// tokio::spawn(async move {
///     tokio::signal::ctrl_c().await.ok();
///     handle.stop();
/// });
/// crawler.run().await;
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct CrawlerHandle {
    signal: Arc<StopSignal>,
}

impl CrawlerHandle {
    /// Asks the session to stop
    ///
    /// A pending delay is cut short. A fetch already in flight completes but
    /// its result is thrown away.
    pub fn stop(&self) {
        self.signal.stopped.store(true, Ordering::SeqCst);
        self.signal.notify.notify_one();
    }

    pub fn is_stopped(&self) -> bool {
        self.signal.stopped.load(Ordering::SeqCst)
    }

    /// Sleeps for `delay` unless stopped first
    ///
    /// # Returns
    ///
    /// `true` if the full delay elapsed without a stop
    async fn sleep(&self, delay: Duration) -> bool {
        if self.is_stopped() {
            return false;
        }
        tokio::select! {
            _ = tokio::time::sleep(delay) => !self.is_stopped(),
            _ = self.signal.notify.notified() => false,
        }
    }
}

/// Main crawler structure
pub struct Crawler<F: PageFetcher> {
    fetcher: F,
    policy: CrawlPolicy,
    frontier: Frontier,
    visited: VisitedSet,
    pacer: Pacer,
    budget: PageBudget,
    state: CrawlState,
    start_urls: Vec<Url>,

    /// Words already sent to the index this session
    announced_words: HashSet<WordHash>,

    events: IndexEventSender,
    handle: CrawlerHandle,
    statistics: CrawlStatistics,
}

impl<F: PageFetcher> Crawler<F> {
    /// Creates a new crawler
    ///
    /// # Arguments
    ///
    /// * `config` - Start URLs, policy, pacing and budget
    /// * `fetcher` - Loads pages
    /// * `events` - Channel to the index writer
    ///
    /// Start URLs that do not parse are skipped with a warning.
    pub fn new(config: &CrawlerConfig, fetcher: F, events: IndexEventSender) -> Self {
        let start_urls = config
            .start_urls
            .iter()
            .filter_map(|raw| match canonicalize_url(raw) {
                Ok(url) => Some(url),
                Err(e) => {
                    tracing::warn!("Ignoring start URL: {}", e);
                    None
                }
            })
            .collect();

        Self {
            fetcher,
            policy: CrawlPolicy::from_config(config),
            frontier: Frontier::new(),
            visited: VisitedSet::new(),
            pacer: Pacer::new(
                config.page_loading_interval_min,
                config.page_loading_interval_max,
            ),
            budget: PageBudget::new(config.page_budget()),
            state: CrawlState::Idle,
            start_urls,
            announced_words: HashSet::new(),
            events,
            handle: CrawlerHandle::default(),
            statistics: CrawlStatistics::default(),
        }
    }

    /// Seeds the random sources, for a reproducible crawl order
    pub fn with_seed(mut self, seed: u64) -> Self {
        let (min_ms, max_ms) = self.pacer.bounds();
        self.frontier = Frontier::with_seed(seed);
        self.pacer = Pacer::with_seed(min_ms, max_ms, seed);
        self
    }

    /// Returns a handle that can stop this crawler from another task
    pub fn handle(&self) -> CrawlerHandle {
        self.handle.clone()
    }

    pub fn state(&self) -> CrawlState {
        self.state
    }

    pub fn statistics(&self) -> &CrawlStatistics {
        &self.statistics
    }

    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    pub fn visited(&self) -> &VisitedSet {
        &self.visited
    }

    /// Starts the session and seeds the frontier with the start URLs
    ///
    /// Has no effect unless the crawler is idle.
    ///
    /// # Returns
    ///
    /// Number of start URLs admitted
    pub fn start(&mut self) -> usize {
        if self.state != CrawlState::Idle {
            tracing::warn!("Crawler already started (state: {})", self.state);
            return 0;
        }

        self.transition(CrawlState::Scheduling);
        self.statistics.started_at = Some(Utc::now());

        let start_urls = self.start_urls.clone();
        let accepted = start_urls
            .into_iter()
            .filter(|url| self.enqueue(url.clone()))
            .count();

        tracing::info!(
            "Crawl session started with {} of {} start URLs",
            accepted,
            self.start_urls.len()
        );
        accepted
    }

    /// Ends the session immediately
    ///
    /// Clears the frontier and cancels any pending delay. Safe to call in
    /// any state.
    pub fn stop(&mut self) {
        self.handle.stop();
        self.finish();
    }

    /// Runs the session until the frontier is empty, the page budget is
    /// spent, or the crawler is stopped
    ///
    /// Starts the session first if needed.
    ///
    /// # Returns
    ///
    /// Statistics for the whole session
    pub async fn run(&mut self) -> CrawlStatistics {
        if self.state == CrawlState::Idle {
            self.start();
        }

        while self.state == CrawlState::Scheduling {
            if self.budget.is_exhausted() {
                tracing::info!("Page budget spent");
                break;
            }

            let delay = self.pacer.next_delay();
            tracing::trace!("Next page load in {:?}", delay);
            if !self.handle.sleep(delay).await {
                tracing::info!("Crawl stopped while scheduling");
                break;
            }

            let Some(url) = self.dequeue_next() else {
                tracing::info!("Frontier is empty, crawl complete");
                break;
            };

            self.dispatch(url).await;
        }

        self.finish();
        self.statistics.clone()
    }

    /// Takes the next URL to fetch from the frontier
    ///
    /// URLs visited since they were queued are skipped.
    ///
    /// # Returns
    ///
    /// `None` once the frontier is exhausted
    pub fn dequeue_next(&mut self) -> Option<Url> {
        loop {
            let url = self.frontier.dequeue_next()?;
            if self.visited.contains(url_hash(&url)) {
                tracing::debug!("Skipping {} (already visited)", url);
                continue;
            }
            tracing::debug!("{} URLs pending", self.frontier.len());
            return Some(url);
        }
    }

    /// Fetches one URL and processes the outcome
    async fn dispatch(&mut self, url: Url) {
        self.transition(CrawlState::Fetching);
        self.visited.mark(url_hash(&url));
        self.statistics.pages_dispatched += 1;
        tracing::debug!("Fetching {}", url);

        let result = self.fetcher.load_page(&url).await;

        if self.handle.is_stopped() {
            tracing::debug!("Discarding result for {} after stop", url);
            self.statistics.pages_discarded += 1;
            self.finish();
            return;
        }

        match result {
            Ok(page) => self.on_page_fetched(page),
            Err(e) => self.on_page_failed(&url, &e),
        }

        if self.state == CrawlState::Fetching {
            self.transition(CrawlState::Scheduling);
        }
    }

    /// Processes a loaded page
    ///
    /// Sends the page's new words and then the page itself to the index,
    /// marks the canonical URL visited, queues the outbound links and counts
    /// the page against the budget. Ignored once the session has finished.
    pub fn on_page_fetched(&mut self, page: FetchedPage) {
        if self.state.is_terminal() || self.handle.is_stopped() {
            tracing::debug!("Session inactive, ignoring {}", page.canonical_url);
            self.statistics.pages_discarded += 1;
            return;
        }

        self.statistics.pages_fetched += 1;

        let words = extract_words_and_frequencies(&page.text);
        let record = PageRecord::from_page(&page.canonical_url, &page.title, &page.html, &words);

        if record.total_word_count > 0 {
            for word in words.keys() {
                if self.announced_words.insert(hash64(word.as_bytes())) {
                    self.send(IndexEvent::AddWord(word.clone()));
                }
            }
            tracing::info!("Fetched {} ({} words)", record.url, record.total_word_count);
            self.send(IndexEvent::AddPage(record.clone()));
            self.statistics.pages_submitted += 1;
        } else {
            tracing::info!("Fetched {} (no words)", record.url);
        }

        // a redirect target may already be waiting
        self.visited.mark(record.url_hash);
        if self.frontier.remove(record.url_hash) {
            tracing::debug!("Dropped {} from the frontier", record.url);
        }

        for link in page.links {
            self.enqueue(link);
        }

        if self.budget.consume() {
            tracing::info!("Page budget spent, finishing session");
            self.finish();
        }
    }

    /// Records a failed fetch; the URL is not retried
    fn on_page_failed(&mut self, url: &Url, error: &FetchError) {
        tracing::warn!("Failed to load {}: {}", url, error);
        self.statistics.pages_failed += 1;
    }

    /// Offers a URL to the frontier
    ///
    /// The fragment is dropped, then the URL is checked against, in order:
    /// the blacklist, the visited set, the crawling zones, the allowed
    /// schemes and the frontier itself.
    ///
    /// # Returns
    ///
    /// `true` if the URL was queued
    pub fn enqueue(&mut self, url: Url) -> bool {
        let url = strip_fragment(url);

        match self.admit(&url) {
            Ok(()) => {
                tracing::debug!("Queued {}", url);
                self.frontier.push(url);
                self.statistics.urls_accepted += 1;
                true
            }
            Err(rejection) => {
                tracing::debug!("Skipping {} ({})", url, rejection);
                self.statistics.record_rejection(rejection);
                false
            }
        }
    }

    fn admit(&self, url: &Url) -> Result<(), Rejection> {
        let hash = url_hash(url);

        if self.policy.is_blacklisted(url) {
            return Err(Rejection::Blacklisted);
        }
        if self.visited.contains(hash) {
            return Err(Rejection::AlreadyVisited);
        }
        if !self.policy.in_zone(url) {
            return Err(Rejection::OutsideZone);
        }
        if !self.policy.scheme_allowed(url) {
            return Err(Rejection::SchemeNotAllowed);
        }
        if self.frontier.contains(hash) {
            return Err(Rejection::AlreadyQueued);
        }
        Ok(())
    }

    fn send(&self, event: IndexEvent) {
        if self.events.send(event).is_err() {
            tracing::warn!("Index writer has shut down; dropping index update");
        }
    }

    fn transition(&mut self, next: CrawlState) {
        if !self.state.can_transition_to(next) {
            tracing::debug!("Ignoring transition {} -> {}", self.state, next);
            return;
        }
        tracing::trace!("Crawler state {} -> {}", self.state, next);
        self.state = next;
    }

    /// Moves to `Finished` and drops the remaining frontier
    fn finish(&mut self) {
        if self.state.is_terminal() {
            return;
        }

        let unvisited = self.frontier.len();
        self.frontier.clear();
        self.transition(CrawlState::Finished);
        self.statistics.finished_at = Some(Utc::now());

        tracing::info!(
            "Crawl session finished: {} pages fetched, {} failed, {} URLs left unvisited",
            self.statistics.pages_fetched,
            self.statistics.pages_failed,
            unvisited
        );
    }
}
