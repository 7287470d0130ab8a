//! Link classification
//!
//! Decides what the crawler does with each outbound link of a fetched page.

use crate::url::page_domain;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use url::Url;

/// Navigation and account pages that never hold article content
static IGNORE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)/(login|register|subscribe|privacy|terms|about|contact|shop|careers|video|gallery|live|search)(?:/|$)",
    )
    .expect("ignore pattern is valid")
});

/// URL shapes that usually point at one article
static ARTICLE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"/\d{4}/\d{2}/\d{2}/|/article/|/news/|/story/|/[a-z0-9-]{30,}\.html$")
        .expect("article pattern is valid")
});

/// What to do with one outbound link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkDecision {
    /// Same-site hub or navigation page: fetch and keep following links
    CrawlFurther,
    /// Same-site page shaped like an article
    ExtractArticle,
    /// Same-site page with no content worth fetching
    Ignore,
    /// Link to another site; never followed
    SkipOffDomain,
}

impl LinkDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CrawlFurther => "crawl-further",
            Self::ExtractArticle => "extract-article",
            Self::Ignore => "ignore",
            Self::SkipOffDomain => "skip-off-domain",
        }
    }
}

impl fmt::Display for LinkDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns true if the path names a page the crawler skips
pub fn is_ignored_path(path: &str) -> bool {
    IGNORE_PATTERN.is_match(path)
}

/// Returns true if the path looks like a single article
pub fn is_article_path(path: &str) -> bool {
    ARTICLE_PATTERN.is_match(path)
}

/// Classifies a link found on a page of `current_domain`
///
/// The checks run in this priority order:
/// 1. Off-site links (page domain differs) are skipped, whatever their path
/// 2. Ignored paths
/// 3. Article-shaped paths
/// 4. Everything else is crawled further
///
/// # Examples
///
/// ```
/// use url::Url;
/// use news_ripple::{classify_link, LinkDecision};
///
/// let link = Url::parse("https://example.com/2024/05/01/markets-update").unwrap();
/// assert_eq!(classify_link(&link, "example.com"), LinkDecision::ExtractArticle);
///
/// let link = Url::parse("https://example.com/about").unwrap();
/// assert_eq!(classify_link(&link, "example.com"), LinkDecision::Ignore);
///
/// let link = Url::parse("https://example.com/markets/today").unwrap();
/// assert_eq!(classify_link(&link, "example.com"), LinkDecision::CrawlFurther);
/// ```
pub fn classify_link(link: &Url, current_domain: &str) -> LinkDecision {
    match page_domain(link) {
        Some(domain) if domain.eq_ignore_ascii_case(current_domain) => {}
        _ => return LinkDecision::SkipOffDomain,
    }

    let path = link.path();
    if is_ignored_path(path) {
        LinkDecision::Ignore
    } else if is_article_path(path) {
        LinkDecision::ExtractArticle
    } else {
        LinkDecision::CrawlFurther
    }
}
