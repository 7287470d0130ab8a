//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - The frontier (pending queue and visited set)
//! - HTTP fetching behind the `FetchService` trait
//! - Link extraction
//! - Per-domain politeness scheduling
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod frontier;
mod parser;
mod scheduler;

pub use coordinator::{analyze_page, Coordinator, PageAnalysis, PageError, PageOutcome};
pub use fetcher::{build_http_client, is_html_content_type, FetchService, FetchedPage, HttpFetcher};
pub use frontier::{CrawlTask, EnqueueOutcome, Frontier, TaskKind};
pub use parser::extract_links;
pub use scheduler::{DomainPermit, Scheduler};

use crate::config::Config;
use crate::output::{ArticleSink, CrawlStats};
use crate::Result;
use std::sync::Arc;
use tokio::sync::watch;

/// Runs a complete crawl over HTTP
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Build the HTTP fetcher from the fetch configuration
/// 2. Seed the frontier with every start URL
/// 3. Crawl until the frontier is exhausted or `shutdown` flips to true
/// 4. Flush the sink
///
/// Returns the run statistics and the sink.
pub async fn crawl<S: ArticleSink>(
    config: &Config,
    sink: S,
    shutdown: watch::Receiver<bool>,
) -> Result<(CrawlStats, S)> {
    let fetcher = Arc::new(HttpFetcher::new(&config.fetch)?);
    let mut coordinator = Coordinator::new(config, fetcher, sink);
    let stats = coordinator.run(shutdown).await;
    Ok((stats, coordinator.into_sink()))
}
