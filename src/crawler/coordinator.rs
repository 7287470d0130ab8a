//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the main crawl loop. The coordinator is the single owner of
//! the frontier, the sink and the statistics; page work runs in spawned tasks that
//! return a [`PageOutcome`] to the loop:
//! - Dispatching tasks from the frontier up to the in-flight cap
//! - Fetching through the politeness gate
//! - Article extraction and link classification (in the page task)
//! - Emitting records and expanding links (in the loop)
//! - Draining in-flight pages on shutdown

use crate::classify::{classify_link, LinkDecision};
use crate::config::Config;
use crate::crawler::fetcher::{FetchService, FetchedPage};
use crate::crawler::frontier::{CrawlTask, EnqueueOutcome, Frontier, TaskKind};
use crate::crawler::parser::extract_links;
use crate::crawler::scheduler::Scheduler;
use crate::extract::{is_article, ExtractedFields};
use crate::markup::PageContext;
use crate::output::{ArticleSink, CrawlStats};
use crate::record::{build_record, ArticleRecord, ValidationFailure};
use crate::state::TaskState;
use crate::url::{is_within_domain, page_domain};
use crate::{FetchError, ParseError};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinSet;
use url::Url;

/// Why a page was discarded
#[derive(Debug, Error)]
pub enum PageError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Page {url} was served from {domain}, outside the seed sites")]
    Offsite { url: String, domain: String },
}

/// What a page task learned about one fetched page
#[derive(Debug)]
pub struct PageAnalysis {
    /// URL the page was served from
    pub final_url: String,

    /// Page domain of the final URL
    pub domain: String,

    /// Record or rejection, when the page went through the article pipeline
    pub article: Option<Result<ArticleRecord, ValidationFailure>>,

    /// Outbound links with their classification, in document order
    pub links: Vec<(Url, LinkDecision)>,
}

/// Result of one page task, reported back to the coordinator
#[derive(Debug)]
pub struct PageOutcome {
    pub task: CrawlTask,
    pub result: Result<PageAnalysis, PageError>,
}

/// Runs the article check, extraction and link classification for a fetched page
///
/// Pages reached through an article-shaped link always go through the article
/// pipeline; any other page does when it carries an `og:title`. Links are
/// classified for every page.
pub fn analyze_page(
    task: &CrawlTask,
    page: FetchedPage,
    seed_domains: &[String],
) -> Result<PageAnalysis, PageError> {
    let context = PageContext::new(&page.final_url, page.markup)?;

    if !seed_domains
        .iter()
        .any(|seed| is_within_domain(&context.domain, seed))
    {
        return Err(PageError::Offsite {
            url: page.final_url,
            domain: context.domain,
        });
    }

    let accessor = context.accessor();

    let article = (task.kind == TaskKind::ExtractArticle || is_article(&accessor)).then(|| {
        let fields = ExtractedFields::from_page(&accessor);
        build_record(context.final_url.as_str(), &fields)
    });

    let links = extract_links(&accessor)
        .into_iter()
        .map(|link| {
            let decision = classify_link(&link, &context.domain);
            tracing::trace!("{} -> {}", link, decision);
            (link, decision)
        })
        .collect();

    Ok(PageAnalysis {
        final_url: context.final_url.to_string(),
        domain: context.domain,
        article,
        links,
    })
}

/// Fetches one task through the politeness gate and analyzes the page
async fn process_task(
    task: CrawlTask,
    fetcher: Arc<dyn FetchService>,
    scheduler: Arc<Scheduler>,
    seed_domains: Arc<Vec<String>>,
) -> PageOutcome {
    let domain = page_domain(&task.url).unwrap_or_else(|| task.origin_domain.clone());

    let fetched = {
        let permit = scheduler.acquire(&domain).await;
        if permit.is_none() {
            tracing::warn!("No politeness slot for {}, fetching {} ungated", domain, task.url);
        }
        let result = fetcher.fetch(&task.url).await;
        drop(permit);
        result
    };

    let result = match fetched {
        Ok(page) => analyze_page(&task, page, &seed_domains),
        Err(e) => Err(PageError::Fetch(e)),
    };

    PageOutcome { task, result }
}

/// Main crawler coordinator structure
pub struct Coordinator<S: ArticleSink> {
    frontier: Frontier,
    fetcher: Arc<dyn FetchService>,
    scheduler: Arc<Scheduler>,
    seed_domains: Arc<Vec<String>>,
    sink: S,
    max_in_flight: usize,
    stats: CrawlStats,
}

impl<S: ArticleSink> Coordinator<S> {
    /// Creates a coordinator and seeds the frontier with every start URL
    ///
    /// Seeds whose start URL does not parse are logged and skipped.
    pub fn new(config: &Config, fetcher: Arc<dyn FetchService>, sink: S) -> Self {
        let mut frontier = Frontier::new(config.crawler.depth_limit);

        for seed in &config.seeds {
            match Url::parse(&seed.start_url) {
                Ok(url) => {
                    let outcome = frontier.seed(url, &seed.domain);
                    tracing::debug!("Seeded {} ({}): {:?}", seed.start_url, seed.domain, outcome);
                }
                Err(e) => tracing::error!("Skipping seed {}: {}", seed.start_url, e),
            }
        }

        Self {
            frontier,
            fetcher,
            scheduler: Arc::new(Scheduler::new(&config.crawler)),
            seed_domains: Arc::new(config.seed_domains()),
            sink,
            max_in_flight: config.crawler.max_concurrent_requests.max(1) as usize,
            stats: CrawlStats::new(),
        }
    }

    /// Runs the main crawl loop until the frontier is exhausted or shutdown is requested
    ///
    /// When `shutdown` flips to true the frontier is closed: pages already in flight
    /// are finished and their records emitted, nothing new is dispatched.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) -> CrawlStats {
        tracing::info!(
            "Starting crawl of {} seed sites (depth limit {})",
            self.seed_domains.len(),
            self.frontier.depth_limit()
        );

        let start_time = Instant::now();
        let mut in_flight: JoinSet<PageOutcome> = JoinSet::new();
        let mut pages_finished: u64 = 0;
        let mut listening = true;

        if *shutdown.borrow() {
            self.frontier.close();
        }

        loop {
            while in_flight.len() < self.max_in_flight {
                let Some(task) = self.frontier.next_task() else {
                    break;
                };
                self.stats.pages_dispatched += 1;
                tracing::debug!(
                    "{} {} (depth {}, {})",
                    TaskState::Dispatched,
                    task.url,
                    task.depth,
                    task.kind
                );
                in_flight.spawn(process_task(
                    task,
                    self.fetcher.clone(),
                    self.scheduler.clone(),
                    self.seed_domains.clone(),
                ));
            }

            if in_flight.is_empty() {
                tracing::info!("Frontier is empty, crawl complete");
                break;
            }

            tokio::select! {
                joined = in_flight.join_next() => {
                    match joined {
                        Some(Ok(outcome)) => self.handle_outcome(outcome),
                        Some(Err(e)) => {
                            tracing::error!("Page task failed: {}", e);
                            self.stats.record_state(TaskState::Discarded);
                        }
                        None => {}
                    }

                    pages_finished += 1;
                    if pages_finished % 10 == 0 {
                        let rate = pages_finished as f64 / start_time.elapsed().as_secs_f64();
                        tracing::info!(
                            "Progress: {} pages crawled, {} articles, {} in frontier, {:.2} pages/sec",
                            pages_finished,
                            self.stats.articles_emitted(),
                            self.frontier.pending_len(),
                            rate
                        );
                    }
                }
                changed = shutdown.changed(), if listening => {
                    match changed {
                        Ok(()) if *shutdown.borrow_and_update() => {
                            tracing::info!(
                                "Shutdown requested, draining {} in-flight pages",
                                in_flight.len()
                            );
                            self.frontier.close();
                            listening = false;
                        }
                        Ok(()) => {}
                        Err(_) => listening = false,
                    }
                }
            }
        }

        if let Err(e) = self.sink.flush() {
            tracing::error!("Failed to flush sink: {}", e);
            self.stats.sink_failures += 1;
        }

        self.stats.finish();
        tracing::info!(
            "Crawl completed: {} pages crawled, {} articles emitted in {:?}",
            pages_finished,
            self.stats.articles_emitted(),
            start_time.elapsed()
        );

        self.stats.clone()
    }

    /// Applies one page outcome: emit the record, expand links, count the result
    fn handle_outcome(&mut self, outcome: PageOutcome) {
        let PageOutcome { task, result } = outcome;

        let analysis = match result {
            Ok(analysis) => analysis,
            Err(PageError::Fetch(e)) => {
                tracing::warn!("Failed to fetch {}: {}", task.url, e);
                self.stats.fetch_errors += 1;
                self.finish(&task, TaskState::Dispatched, TaskState::Discarded);
                return;
            }
            Err(e) => {
                tracing::warn!("Discarding {}: {}", task.url, e);
                self.stats.parse_errors += 1;
                self.finish(&task, TaskState::Fetched, TaskState::Discarded);
                return;
            }
        };

        tracing::trace!("{} {}", TaskState::Fetched, analysis.final_url);

        let mut state = TaskState::LinksExpanded;
        match analysis.article {
            Some(Ok(record)) => match self.sink.emit(&record) {
                Ok(()) => {
                    tracing::info!("Extracted article: {} ({})", record.title, record.url);
                    state = TaskState::ArticleEmitted;
                }
                Err(e) => {
                    tracing::error!("Failed to write record for {}: {}", record.url, e);
                    self.stats.sink_failures += 1;
                }
            },
            Some(Err(failure)) => {
                tracing::warn!("Skipping article {}: {}", analysis.final_url, failure);
                self.stats.validation_rejects += 1;
            }
            None => {}
        }

        self.expand_links(&task, analysis.links);
        self.finish(&task, TaskState::Fetched, state);
    }

    fn expand_links(&mut self, parent: &CrawlTask, links: Vec<(Url, LinkDecision)>) {
        for (link, decision) in links {
            self.stats.record_link(decision);
            match self.frontier.enqueue_link(parent, link, decision) {
                EnqueueOutcome::DepthExceeded => self.stats.depth_exceeded += 1,
                EnqueueOutcome::AlreadyVisited => self.stats.duplicates_skipped += 1,
                _ => {}
            }
        }
    }

    fn finish(&mut self, task: &CrawlTask, from: TaskState, state: TaskState) {
        if !state.is_terminal() || !from.can_transition_to(state) {
            tracing::error!("Unexpected transition {} -> {} for {}", from, state, task.url);
        }
        tracing::debug!("{} {}", state, task.url);
        self.stats.record_state(state);
    }

    /// The frontier, for inspection
    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    /// Statistics collected so far
    pub fn stats(&self) -> &CrawlStats {
        &self.stats
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Consumes the coordinator, returning its sink
    pub fn into_sink(self) -> S {
        self.sink
    }
}
