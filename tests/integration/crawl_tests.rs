//! Integration tests for the crawler
//!
//! The wiremock tests run the full crawl cycle over HTTP against a local mock
//! server. The stub-fetcher tests serve pages for arbitrary domains from memory.

use async_trait::async_trait;
use news_ripple::config::{parse_config, Config, CrawlerConfig, FetchConfig, OutputConfig, SeedEntry};
use news_ripple::crawler::{crawl, Coordinator, FetchService, FetchedPage};
use news_ripple::output::{JsonLinesSink, MemorySink};
use news_ripple::{ArticleRecord, FetchError, LinkDecision, TaskState};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::watch;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration for one seed site
fn create_test_config(domain: &str, start_url: &str, depth_limit: u32) -> Config {
    Config {
        crawler: CrawlerConfig {
            depth_limit,
            concurrent_requests_per_domain: 4,
            max_concurrent_requests: 8,
            request_delay: 0,
        },
        fetch: FetchConfig {
            user_agent: "TestBot/1.0".to_string(),
            timeout: 5,
            max_redirects: 5,
        },
        output: OutputConfig {
            path: "unused.jsonl".to_string(),
        },
        seeds: vec![SeedEntry {
            domain: domain.to_string(),
            start_url: start_url.to_string(),
        }],
    }
}

/// A receiver whose sender is already gone; the crawl runs to completion
fn no_shutdown() -> watch::Receiver<bool> {
    watch::channel(false).1
}

/// A body of exactly `len` characters
fn body_of(len: usize) -> String {
    "abcdefghij".repeat(len / 10 + 1)[..len].to_string()
}

fn article_page(title: &str, body: &str) -> String {
    format!(
        r#"<html><head><title>{title} | Site</title></head>
        <body><h1>{title}</h1><div class="article-body"><p>{body}</p></div></body></html>"#
    )
}

/// Serves pages from a map, counting fetches per URL
#[derive(Default)]
struct StubFetcher {
    pages: HashMap<String, String>,
    failing: Vec<String>,
    fetches: Mutex<HashMap<String, usize>>,
    total: AtomicUsize,
}

impl StubFetcher {
    fn page(mut self, url: &str, markup: impl Into<String>) -> Self {
        self.pages.insert(url.to_string(), markup.into());
        self
    }

    fn failing(mut self, url: &str) -> Self {
        self.failing.push(url.to_string());
        self
    }

    fn fetch_count(&self, url: &str) -> usize {
        self.fetches.lock().unwrap().get(url).copied().unwrap_or(0)
    }
}

#[async_trait]
impl FetchService for StubFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        let key = url.to_string();
        self.total.fetch_add(1, Ordering::SeqCst);
        *self.fetches.lock().unwrap().entry(key.clone()).or_insert(0) += 1;

        if self.failing.contains(&key) {
            return Err(FetchError::Status { url: key, status: 500 });
        }

        match self.pages.get(&key) {
            Some(markup) => Ok(FetchedPage {
                final_url: key,
                status: 200,
                markup: markup.clone(),
            }),
            None => Err(FetchError::Status { url: key, status: 404 }),
        }
    }
}

#[tokio::test]
async fn test_example_site_depth_one() {
    let fetcher = Arc::new(
        StubFetcher::default()
            .page(
                "https://example.com/",
                r#"<html><head><title>Example News</title></head><body>
                <a href="/about">About</a>
                <a href="/2024/05/01/story">Story</a>
                </body></html>"#,
            )
            .page(
                "https://example.com/2024/05/01/story",
                format!(
                    r#"<html><head><title>Markets Rally | Example</title></head><body>
                    <h1>Markets Rally</h1>
                    <article><p>{}</p></article>
                    <a href="/2024/05/02/next">Next</a>
                    </body></html>"#,
                    body_of(250)
                ),
            ),
    );

    let config = create_test_config("example.com", "https://example.com/", 1);
    let sink = MemorySink::new();
    let mut coordinator = Coordinator::new(&config, fetcher.clone(), sink.clone());
    let stats = coordinator.run(no_shutdown()).await;

    // About is ignored, the story is an article task
    assert_eq!(fetcher.fetch_count("https://example.com/about"), 0);
    assert_eq!(fetcher.fetch_count("https://example.com/2024/05/01/story"), 1);
    assert_eq!(stats.links_with(LinkDecision::Ignore), 1);
    assert!(stats.links_with(LinkDecision::ExtractArticle) >= 1);

    // The story's own link would be depth 2
    assert_eq!(fetcher.fetch_count("https://example.com/2024/05/02/next"), 0);
    assert_eq!(stats.depth_exceeded, 1);

    let records = sink.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].title, "Markets Rally");
    assert_eq!(records[0].url, "https://example.com/2024/05/01/story");
    assert_eq!(records[0].text.chars().count(), 250);
    assert_eq!(stats.articles_emitted(), 1);
    assert_eq!(stats.pages_in(TaskState::LinksExpanded), 1);
}

#[tokio::test]
async fn test_body_length_floor() {
    let fetcher = Arc::new(
        StubFetcher::default()
            .page(
                "https://example.com/",
                r#"<html><body>
                <a href="/news/short">Short</a>
                <a href="/news/exact">Exact</a>
                </body></html>"#,
            )
            .page("https://example.com/news/short", article_page("Short One", &body_of(199)))
            .page("https://example.com/news/exact", article_page("Exact One", &body_of(200))),
    );

    let config = create_test_config("example.com", "https://example.com/", 1);
    let sink = MemorySink::new();
    let stats = Coordinator::new(&config, fetcher, sink.clone())
        .run(no_shutdown())
        .await;

    let records = sink.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].title, "Exact One");
    assert_eq!(stats.validation_rejects, 1);
}

#[tokio::test]
async fn test_each_url_fetched_once() {
    let hub = r#"<html><body>
        <a href="/markets">Markets</a>
        <a href="/markets/">Markets again</a>
        <a href="https://www.example.com/markets?utm_source=nav">Tracked</a>
        <a href="/">Home</a>
        </body></html>"#;
    let fetcher = Arc::new(
        StubFetcher::default()
            .page("https://example.com/", hub)
            .page("https://example.com/markets", hub),
    );

    let config = create_test_config("example.com", "https://example.com/", 3);
    let stats = Coordinator::new(&config, fetcher.clone(), MemorySink::new())
        .run(no_shutdown())
        .await;

    assert_eq!(fetcher.total.load(Ordering::SeqCst), 2);
    assert_eq!(fetcher.fetch_count("https://example.com/"), 1);
    assert_eq!(fetcher.fetch_count("https://example.com/markets"), 1);
    assert_eq!(stats.pages_dispatched, 2);
    assert!(stats.duplicates_skipped > 0);
}

#[tokio::test]
async fn test_failing_page_does_not_stop_siblings() {
    let fetcher = Arc::new(
        StubFetcher::default()
            .page(
                "https://example.com/",
                r#"<html><body>
                <a href="/news/broken">Broken</a>
                <a href="/news/missing">Missing</a>
                <a href="/news/good">Good</a>
                </body></html>"#,
            )
            .failing("https://example.com/news/broken")
            .page("https://example.com/news/good", article_page("Good One", &body_of(300))),
    );

    let config = create_test_config("example.com", "https://example.com/", 2);
    let sink = MemorySink::new();
    let stats = Coordinator::new(&config, fetcher, sink.clone())
        .run(no_shutdown())
        .await;

    assert_eq!(sink.len(), 1);
    assert_eq!(stats.fetch_errors, 2);
    assert_eq!(stats.pages_in(TaskState::Discarded), 2);
    assert_eq!(stats.articles_emitted(), 1);
}

#[tokio::test]
async fn test_off_domain_links_never_fetched() {
    let fetcher = Arc::new(StubFetcher::default().page(
        "https://example.com/",
        r#"<html><body>
        <a href="https://other.com/2024/05/01/story">Other</a>
        <a href="https://news.example.com/news/a">Subdomain</a>
        </body></html>"#,
    ));

    let config = create_test_config("example.com", "https://example.com/", 3);
    let stats = Coordinator::new(&config, fetcher.clone(), MemorySink::new())
        .run(no_shutdown())
        .await;

    assert_eq!(fetcher.total.load(Ordering::SeqCst), 1);
    assert_eq!(stats.links_with(LinkDecision::SkipOffDomain), 2);
}

#[tokio::test]
async fn test_depth_zero_fetches_only_seeds() {
    let fetcher = Arc::new(StubFetcher::default().page(
        "https://example.com/",
        r#"<html><body><a href="/markets">Markets</a></body></html>"#,
    ));

    let config = create_test_config("example.com", "https://example.com/", 0);
    let stats = Coordinator::new(&config, fetcher.clone(), MemorySink::new())
        .run(no_shutdown())
        .await;

    assert_eq!(fetcher.total.load(Ordering::SeqCst), 1);
    assert_eq!(stats.depth_exceeded, 1);
}

#[tokio::test]
async fn test_shutdown_before_start_dispatches_nothing() {
    let fetcher = Arc::new(StubFetcher::default().page("https://example.com/", "<html></html>"));
    let config = create_test_config("example.com", "https://example.com/", 3);

    let (_tx, rx) = watch::channel(true);
    let stats = Coordinator::new(&config, fetcher.clone(), MemorySink::new())
        .run(rx)
        .await;

    assert_eq!(fetcher.total.load(Ordering::SeqCst), 0);
    assert_eq!(stats.pages_dispatched, 0);
}

#[tokio::test]
async fn test_full_crawl_over_http() {
    // Start a mock server
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let domain = Url::parse(&base_url)
        .expect("Failed to parse base URL")
        .host_str()
        .expect("Failed to extract host")
        .to_string();

    // Mock index page with links
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(
                    r#"<html><head><title>Home</title></head><body>
                    <a href="/markets">Markets</a>
                    <a href="/login">Log in</a>
                    <a href="/report.pdf">Report</a>
                    </body></html>"#,
                    "text/html",
                ),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    // Hub page whose og:title makes it an article too
    let markets = format!(
        r#"<html><head>
        <meta property="og:title" content="Markets Today">
        <meta name="author" content="Jane Doe">
        <meta property="article:published_time" content="2024-05-01T09:00:00Z">
        <meta property="og:description" content="What moved markets.">
        </head><body>
        <div class="story-content"><p>{}</p></div>
        <a href="/2024/05/01/fed-holds-rates">Fed</a>
        </body></html>"#,
        body_of(220)
    );
    Mock::given(method("GET"))
        .and(path("/markets"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(markets, "text/html; charset=utf-8"))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/2024/05/01/fed-holds-rates"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(article_page("Fed Holds Rates", &body_of(400)), "text/html"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/report.pdf"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(vec![0x25, 0x50, 0x44, 0x46])
                .insert_header("content-type", "application/pdf"),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let out = dir.path().join("articles.jsonl");

    let config_text = format!(
        r#"
[crawler]
depth-limit = 2
concurrent-requests-per-domain = 2
request-delay = 10

[fetch]
user-agent = "TestBot/1.0"
timeout = 5

[output]
path = "{}"

[[seed]]
domain = "{}"
start-url = "{}/"
"#,
        out.display(),
        domain,
        base_url
    );
    let config = parse_config(&config_text).expect("config should validate");

    let sink = JsonLinesSink::create(&config.output.path).unwrap();
    let (stats, sink) = tokio::time::timeout(
        Duration::from_secs(30),
        crawl(&config, sink, no_shutdown()),
    )
    .await
    .expect("crawl should finish")
    .expect("crawl should succeed");

    assert_eq!(sink.written(), 2);
    assert_eq!(stats.pages_dispatched, 4);
    assert_eq!(stats.fetch_errors, 1);

    let content = std::fs::read_to_string(&out).unwrap();
    let records: Vec<ArticleRecord> = content
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(records.len(), 2);

    let markets = records.iter().find(|r| r.title == "Markets Today").unwrap();
    assert_eq!(markets.author, "Jane Doe");
    assert_eq!(markets.date, "2024-05-01T09:00:00Z");
    assert_eq!(markets.summary, "What moved markets.");

    let fed = records.iter().find(|r| r.title == "Fed Holds Rates").unwrap();
    assert_eq!(fed.author, "No Author Found");
    assert_eq!(fed.date, "No Date Found");
    assert_eq!(fed.summary, "No Summary Found");
    assert!(fed.url.ends_with("/2024/05/01/fed-holds-rates"));
}
