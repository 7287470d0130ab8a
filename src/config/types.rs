use serde::Deserialize;

/// Main configuration structure for News-Ripple
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    pub output: OutputConfig,
    /// Seed sites, in the order they are crawled
    #[serde(default, rename = "seed")]
    pub seeds: Vec<SeedEntry>,
}

impl Config {
    /// Returns the configured seed domains
    pub fn seed_domains(&self) -> Vec<String> {
        self.seeds.iter().map(|s| s.domain.clone()).collect()
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum link depth from a seed page (seeds are depth 0)
    #[serde(rename = "depth-limit")]
    pub depth_limit: u32,

    /// Maximum number of in-flight requests to a single domain
    #[serde(rename = "concurrent-requests-per-domain")]
    pub concurrent_requests_per_domain: u32,

    /// Maximum number of in-flight requests overall
    #[serde(rename = "max-concurrent-requests", default = "default_max_concurrent")]
    pub max_concurrent_requests: u32,

    /// Minimum time between two requests to the same domain (milliseconds)
    #[serde(rename = "request-delay")]
    pub request_delay: u64,
}

fn default_max_concurrent() -> u32 {
    16
}

/// HTTP fetch configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    /// User-Agent header sent with every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Request timeout (seconds)
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Maximum number of redirects followed per request
    #[serde(rename = "max-redirects", default = "default_max_redirects")]
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout: default_timeout(),
            max_redirects: default_max_redirects(),
        }
    }
}

fn default_user_agent() -> String {
    concat!("news-ripple/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_max_redirects() -> usize {
    10
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path of the JSON Lines file records are written to
    pub path: String,
}

/// A seed site: the domain it belongs to and where crawling starts
#[derive(Debug, Clone, Deserialize)]
pub struct SeedEntry {
    /// Site domain (e.g., "reuters.com"); subdomains belong to it
    pub domain: String,

    /// Entry point of the crawl for this site
    #[serde(rename = "start-url")]
    pub start_url: String,
}
