/// Crawl session state definitions
///
/// A session moves `Idle -> Scheduling -> Fetching -> Scheduling -> ...`
/// and ends in `Finished`, either because the frontier ran dry, the page
/// budget was spent, or the session was stopped.
use std::fmt;

/// Represents the current state of a crawl session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CrawlState {
    /// Session not started yet
    #[default]
    Idle,

    /// Waiting for the pacing timer before the next dispatch
    Scheduling,

    /// One page has been handed to the fetcher
    Fetching,

    /// Session over; nothing more will be fetched
    Finished,
}

impl CrawlState {
    /// Returns true if the session has ended
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished)
    }

    /// Returns true while the session is running
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Scheduling | Self::Fetching)
    }

    /// Returns true if moving to `next` is a legal transition
    ///
    /// Any state may move to `Finished`; a finished session never restarts.
    pub fn can_transition_to(&self, next: CrawlState) -> bool {
        match (self, next) {
            (Self::Finished, _) => false,
            (_, Self::Finished) => true,
            (Self::Idle, Self::Scheduling) => true,
            (Self::Scheduling, Self::Fetching) => true,
            (Self::Fetching, Self::Scheduling) => true,
            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Scheduling => "scheduling",
            Self::Fetching => "fetching",
            Self::Finished => "finished",
        }
    }
}

impl fmt::Display for CrawlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
