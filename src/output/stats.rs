//! Crawl statistics
//!
//! Counters are updated by the crawl loop as pages finish and printed at the end of
//! a run.

use crate::classify::LinkDecision;
use crate::state::TaskState;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Crawl statistics summary
#[derive(Debug, Clone)]
pub struct CrawlStats {
    /// When the run started
    pub started_at: DateTime<Utc>,

    /// When the run finished (None while running)
    pub finished_at: Option<DateTime<Utc>>,

    /// Number of tasks dispatched for fetching
    pub pages_dispatched: u64,

    /// Count of pages by terminal state
    pub pages_by_state: HashMap<TaskState, u64>,

    /// Count of outbound links by classifier decision
    pub links_by_decision: HashMap<LinkDecision, u64>,

    /// Links dropped because they would exceed the depth limit
    pub depth_exceeded: u64,

    /// Links or tasks skipped because the URL was already visited
    pub duplicates_skipped: u64,

    /// Pages whose fetch failed
    pub fetch_errors: u64,

    /// Pages that could not be parsed or were served off-site
    pub parse_errors: u64,

    /// Article pages rejected by validation
    pub validation_rejects: u64,

    /// Records the sink failed to write
    pub sink_failures: u64,
}

impl Default for CrawlStats {
    fn default() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            pages_dispatched: 0,
            pages_by_state: HashMap::new(),
            links_by_decision: HashMap::new(),
            depth_exceeded: 0,
            duplicates_skipped: 0,
            fetch_errors: 0,
            parse_errors: 0,
            validation_rejects: 0,
            sink_failures: 0,
        }
    }
}

impl CrawlStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts a page reaching a terminal state
    pub fn record_state(&mut self, state: TaskState) {
        *self.pages_by_state.entry(state).or_insert(0) += 1;
    }

    /// Counts one classified link
    pub fn record_link(&mut self, decision: LinkDecision) {
        *self.links_by_decision.entry(decision).or_insert(0) += 1;
    }

    /// Number of pages in `state`
    pub fn pages_in(&self, state: TaskState) -> u64 {
        self.pages_by_state.get(&state).copied().unwrap_or(0)
    }

    /// Number of links classified as `decision`
    pub fn links_with(&self, decision: LinkDecision) -> u64 {
        self.links_by_decision.get(&decision).copied().unwrap_or(0)
    }

    /// Number of pages that reached any terminal state
    pub fn total_pages(&self) -> u64 {
        self.pages_by_state.values().sum()
    }

    /// Number of records handed to the sink
    pub fn articles_emitted(&self) -> u64 {
        self.pages_in(TaskState::ArticleEmitted)
    }

    /// Marks the run as finished
    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Run duration in seconds, if finished
    pub fn duration_seconds(&self) -> Option<i64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_seconds())
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStats) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Started: {}", stats.started_at.to_rfc3339());
    if let Some(seconds) = stats.duration_seconds() {
        println!("  Duration: {}s", seconds);
    }
    println!("  Pages dispatched: {}", stats.pages_dispatched);
    println!("  Articles emitted: {}", stats.articles_emitted());
    println!();

    let total = stats.total_pages();
    println!("Pages by State:");
    for state in TaskState::terminal_states() {
        let count = stats.pages_in(state);
        let percentage = if total > 0 {
            (count as f64 / total as f64) * 100.0
        } else {
            0.0
        };
        println!("  {}: {} ({:.1}%)", state, count, percentage);
    }
    println!();

    println!("Links by Decision:");
    for decision in [
        LinkDecision::CrawlFurther,
        LinkDecision::ExtractArticle,
        LinkDecision::Ignore,
        LinkDecision::SkipOffDomain,
    ] {
        println!("  {}: {}", decision, stats.links_with(decision));
    }
    println!("  depth limit reached: {}", stats.depth_exceeded);
    println!("  already visited: {}", stats.duplicates_skipped);
    println!();

    let errors = stats.fetch_errors + stats.parse_errors + stats.sink_failures;
    if errors > 0 || stats.validation_rejects > 0 {
        println!("Error Summary:");
        println!("  Fetch errors: {}", stats.fetch_errors);
        println!("  Parse errors: {}", stats.parse_errors);
        println!("  Validation rejects: {}", stats.validation_rejects);
        println!("  Sink failures: {}", stats.sink_failures);
        println!();
    }
}
