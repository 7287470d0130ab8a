//! Crawl frontier
//!
//! The frontier owns the pending queue and the visited set for one run. It is
//! driven by a single owner (the coordinator loop); concurrent page work reports
//! back to that owner instead of touching the frontier directly.

use crate::classify::LinkDecision;
use crate::url::normalize_url;
use std::collections::{HashSet, VecDeque};
use std::fmt;
use url::Url;

/// Why a task exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    /// Start page of a seed site
    Seed,
    /// Link classified as a hub or navigation page
    CrawlFurther,
    /// Link classified as an article
    ExtractArticle,
}

impl TaskKind {
    /// Maps a link decision to the task kind it creates, if any
    pub fn from_decision(decision: LinkDecision) -> Option<Self> {
        match decision {
            LinkDecision::CrawlFurther => Some(Self::CrawlFurther),
            LinkDecision::ExtractArticle => Some(Self::ExtractArticle),
            LinkDecision::Ignore | LinkDecision::SkipOffDomain => None,
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Seed => "seed",
            Self::CrawlFurther => "crawl-further",
            Self::ExtractArticle => "extract-article",
        };
        f.write_str(name)
    }
}

/// One unit of crawl work; never mutated after creation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTask {
    /// URL as discovered; this is what gets fetched
    pub url: Url,

    /// Link distance from the seed page (seeds are 0)
    pub depth: u32,

    /// Seed domain this task's chain started from
    pub origin_domain: String,

    pub kind: TaskKind,
}

/// Result of offering a task to the frontier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    /// A task was created and queued
    Queued,
    /// The link decision does not produce tasks
    NotFollowed,
    /// The task would exceed the depth limit
    DepthExceeded,
    /// The URL has already been dispatched
    AlreadyVisited,
    /// The URL could not be normalized
    Invalid,
    /// The frontier no longer accepts tasks
    Closed,
}

/// Pending tasks plus the visited set for one crawl run
#[derive(Debug)]
pub struct Frontier {
    depth_limit: u32,
    pending: VecDeque<CrawlTask>,
    visited: HashSet<String>,
    closed: bool,
}

impl Frontier {
    /// Creates an empty frontier
    pub fn new(depth_limit: u32) -> Self {
        Self {
            depth_limit,
            pending: VecDeque::new(),
            visited: HashSet::new(),
            closed: false,
        }
    }

    pub fn depth_limit(&self) -> u32 {
        self.depth_limit
    }

    /// Queues a seed start page at depth 0
    pub fn seed(&mut self, url: Url, domain: &str) -> EnqueueOutcome {
        self.push(CrawlTask {
            url,
            depth: 0,
            origin_domain: domain.to_string(),
            kind: TaskKind::Seed,
        })
    }

    /// Offers a link found on `parent`'s page
    ///
    /// A task is created at `parent.depth + 1` only for followable decisions, only
    /// within the depth limit, and only if the URL has not been visited.
    pub fn enqueue_link(
        &mut self,
        parent: &CrawlTask,
        url: Url,
        decision: LinkDecision,
    ) -> EnqueueOutcome {
        if self.closed {
            return EnqueueOutcome::Closed;
        }

        let Some(kind) = TaskKind::from_decision(decision) else {
            return EnqueueOutcome::NotFollowed;
        };

        let depth = parent.depth + 1;
        if depth > self.depth_limit {
            return EnqueueOutcome::DepthExceeded;
        }

        self.push(CrawlTask {
            url,
            depth,
            origin_domain: parent.origin_domain.clone(),
            kind,
        })
    }

    fn push(&mut self, task: CrawlTask) -> EnqueueOutcome {
        if self.closed {
            return EnqueueOutcome::Closed;
        }
        if task.depth > self.depth_limit {
            return EnqueueOutcome::DepthExceeded;
        }

        match visit_key(&task.url) {
            Some(key) if self.visited.contains(&key) => EnqueueOutcome::AlreadyVisited,
            Some(_) => {
                self.pending.push_back(task);
                EnqueueOutcome::Queued
            }
            None => EnqueueOutcome::Invalid,
        }
    }

    /// Pops the next task to dispatch and marks its URL visited
    ///
    /// Queued tasks whose URL was dispatched in the meantime are dropped. Returns
    /// None when nothing is pending or the frontier is closed.
    pub fn next_task(&mut self) -> Option<CrawlTask> {
        if self.closed {
            return None;
        }

        while let Some(task) = self.pending.pop_front() {
            let Some(key) = visit_key(&task.url) else {
                continue;
            };
            if self.visited.insert(key) {
                return Some(task);
            }
            tracing::trace!("Skipping already visited {}", task.url);
        }
        None
    }

    /// Returns true if the URL has been dispatched in this run
    pub fn is_visited(&self, url: &Url) -> bool {
        visit_key(url).is_some_and(|key| self.visited.contains(&key))
    }

    /// Stops accepting and dispatching tasks; pending tasks are dropped
    pub fn close(&mut self) {
        if !self.closed {
            tracing::info!("Closing frontier with {} pending tasks", self.pending.len());
        }
        self.closed = true;
        self.pending.clear();
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Number of queued tasks
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Number of URLs dispatched so far
    pub fn visited_len(&self) -> usize {
        self.visited.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

fn visit_key(url: &Url) -> Option<String> {
    normalize_url(url.as_str()).ok().map(String::from)
}
