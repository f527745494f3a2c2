//! Ordered index updates
//!
//! The crawler never touches the [`Indexer`] directly. It sends
//! [`IndexEvent`]s over a single channel, and one writer task applies them
//! in the order they were sent. A page's `AddWord` events are always sent
//! before its `AddPage` event, so the dictionary already knows every word
//! by the time the page is inserted.

use super::{Indexer, PageRecord};
use tokio::sync::mpsc;

/// One update to apply to an index
#[derive(Debug, Clone, PartialEq)]
pub enum IndexEvent {
    /// Register a word in the dictionary
    AddWord(String),

    /// Insert a page; its words must already be registered
    AddPage(PageRecord),
}

pub type IndexEventSender = mpsc::UnboundedSender<IndexEvent>;
pub type IndexEventReceiver = mpsc::UnboundedReceiver<IndexEvent>;

/// Creates the channel between a crawler and its index writer
pub fn index_channel() -> (IndexEventSender, IndexEventReceiver) {
    mpsc::unbounded_channel()
}

impl Indexer {
    /// Applies a single event
    ///
    /// # Returns
    ///
    /// `true` if the index changed
    pub fn apply(&mut self, event: IndexEvent) -> bool {
        match event {
            IndexEvent::AddWord(word) => self.add_word(&word),
            IndexEvent::AddPage(record) => {
                let url = record.url.clone();
                let inserted = self.add_page(record);
                if inserted {
                    tracing::debug!("Indexed {}", url);
                }
                inserted
            }
        }
    }
}

/// Applies events until every sender is dropped, then returns the index
///
/// # Arguments
///
/// * `indexer` - Index to update; handed back when the channel closes
/// * `events` - Receiving end of [`index_channel`]
pub async fn run_index_writer(mut indexer: Indexer, mut events: IndexEventReceiver) -> Indexer {
    let mut words_added = 0u64;
    let mut pages_added = 0u64;
    let mut pages_rejected = 0u64;

    while let Some(event) = events.recv().await {
        let is_page = matches!(event, IndexEvent::AddPage(_));
        let changed = indexer.apply(event);
        match (is_page, changed) {
            (true, true) => pages_added += 1,
            (true, false) => pages_rejected += 1,
            (false, true) => words_added += 1,
            (false, false) => {}
        }
    }

    tracing::info!(
        "Index writer finished: {} new words, {} pages indexed, {} pages rejected",
        words_added,
        pages_added,
        pages_rejected
    );
    indexer
}
