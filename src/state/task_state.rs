/// Task state definitions for tracking crawl progress
///
/// A task moves `Pending -> Dispatched -> Fetched` and then ends in exactly one of
/// the terminal states. A failed fetch goes straight from `Dispatched` to `Discarded`.
use std::fmt;

/// Represents the current state of a crawl task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TaskState {
    // ===== Active States =====
    /// Task is queued in the frontier
    Pending,

    /// Fetch requested; the URL is now in the visited set
    Dispatched,

    /// Response received and wrapped in a page context
    Fetched,

    // ===== Terminal States =====
    /// Page was an article and a record reached the sink
    ArticleEmitted,

    /// Page produced no record; its links were expanded
    LinksExpanded,

    /// Fetch, parse or offsite check failed; nothing was kept
    Discarded,
}

impl TaskState {
    /// Returns true if no further processing happens for the task
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::ArticleEmitted | Self::LinksExpanded | Self::Discarded
        )
    }

    /// Returns true if `next` is a legal successor of this state
    pub fn can_transition_to(&self, next: TaskState) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Dispatched)
                | (Self::Dispatched, Self::Fetched)
                | (Self::Dispatched, Self::Discarded)
                | (Self::Fetched, Self::ArticleEmitted)
                | (Self::Fetched, Self::LinksExpanded)
                | (Self::Fetched, Self::Discarded)
        )
    }

    /// Converts the task state to its log/statistics name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Dispatched => "dispatched",
            Self::Fetched => "fetched",
            Self::ArticleEmitted => "article_emitted",
            Self::LinksExpanded => "links_expanded",
            Self::Discarded => "discarded",
        }
    }

    /// Returns the terminal states, in report order
    pub fn terminal_states() -> [Self; 3] {
        [Self::ArticleEmitted, Self::LinksExpanded, Self::Discarded]
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
