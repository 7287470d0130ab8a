//! Per-field fallback chains
//!
//! Each field has an ordered list of strategies. The extractor walks the list and
//! stops at the first strategy that yields non-empty normalized text; site-specific
//! markup comes before generic guesses.

use crate::extract::clean_text;
use crate::markup::MarkupAccessor;

pub const TITLE_NOT_FOUND: &str = "No Title Found";
pub const AUTHOR_NOT_FOUND: &str = "No Author Found";
pub const DATE_NOT_FOUND: &str = "No Date Found";
pub const SUMMARY_NOT_FOUND: &str = "No Summary Found";

/// How a strategy turns query values into one string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pick {
    /// The first value that is non-empty after normalization
    First,
    /// All values joined by single spaces, then normalized
    Joined,
}

/// One extraction strategy: a query and how to read its values
#[derive(Debug, Clone, Copy)]
pub struct Strategy {
    pub name: &'static str,
    pub selector: &'static str,
    pub pick: Pick,
}

impl Strategy {
    const fn first(name: &'static str, selector: &'static str) -> Self {
        Self {
            name,
            selector,
            pick: Pick::First,
        }
    }

    const fn joined(name: &'static str, selector: &'static str) -> Self {
        Self {
            name,
            selector,
            pick: Pick::Joined,
        }
    }

    /// Applies the strategy; None when it produced nothing usable
    pub fn apply(&self, page: &MarkupAccessor) -> Option<String> {
        let values = match page.try_query(self.selector) {
            Ok(values) => values,
            Err(e) => {
                tracing::warn!(strategy = self.name, "Skipping strategy: {}", e);
                return None;
            }
        };
        let text = match self.pick {
            Pick::First => values.iter().map(|v| clean_text(v)).find(|v| !v.is_empty())?,
            Pick::Joined => clean_text(&values.join(" ")),
        };
        (!text.is_empty()).then_some(text)
    }
}

/// Presence of this value marks a page as an article
pub const OG_TITLE: Strategy =
    Strategy::first("og:title", r#"//meta[@property="og:title"]/@content"#);

pub const TITLE_CHAIN: &[Strategy] = &[
    OG_TITLE,
    Strategy::first("h1", "h1::text"),
    Strategy::first("title", "//title/text()"),
];

pub const AUTHOR_CHAIN: &[Strategy] = &[
    Strategy::first("meta author", r#"//meta[@name="author"]/@content"#),
    Strategy::first("article:author", r#"//meta[@property="article:author"]/@content"#),
    Strategy::first(
        "byline",
        r#"span.byline__name::text, a[rel="author"]::text, .author-name::text, .byline a::text"#,
    ),
];

pub const DATE_CHAIN: &[Strategy] = &[
    Strategy::first(
        "article:published_time",
        r#"//meta[@property="article:published_time"]/@content"#,
    ),
    Strategy::first("time[datetime]", "time::attr(datetime)"),
    Strategy::first("pubdate", r#"//meta[@name="pubdate"]/@content"#),
    // Nasdaq
    Strategy::first(
        "cxense publishtime",
        r#"//meta[@name="cXenseParse:recs:publishtime"]/@content"#,
    ),
    Strategy::first("meta date", r#"//meta[@name="date"]/@content"#),
];

pub const SUMMARY_CHAIN: &[Strategy] = &[
    Strategy::first("og:description", r#"//meta[@property="og:description"]/@content"#),
    Strategy::first("meta description", r#"//meta[@name="description"]/@content"#),
    Strategy::first("itemprop description", r#"[itemprop="description"]::text"#),
];

pub const BODY_CHAIN: &[Strategy] = &[
    Strategy::joined(
        "article containers",
        concat!(
            "div.article-body p::text, ",
            "div.entry-content p::text, ",
            "article p::text, ",
            "div.article-content p::text, ",
            "div.story-content p::text, ",
            "div.post-content p::text, ",
            r#"[itemprop="articleBody"] p::text"#,
        ),
    ),
    Strategy::joined("article paragraphs", "article p::text"),
    Strategy::joined(
        "article-like divs",
        concat!(
            r#"div[class*="article"] p::text, "#,
            r#"div[class*="story"] p::text, "#,
            r#"div[id*="article"] p::text, "#,
            r#"div[id*="story"] p::text"#,
        ),
    ),
];

/// Folds a chain, returning the first strategy result
pub fn run_chain(field: &str, chain: &[Strategy], page: &MarkupAccessor) -> Option<String> {
    let found = chain.iter().find_map(|strategy| {
        strategy.apply(page).map(|value| {
            tracing::trace!(field, strategy = strategy.name, "Field matched");
            value
        })
    });
    if found.is_none() {
        tracing::trace!(field, "No strategy matched");
    }
    found
}

/// Returns true if the page carries an `og:title`
pub fn is_article(page: &MarkupAccessor) -> bool {
    OG_TITLE.apply(page).is_some()
}

/// Extracts the title, or the title sentinel
pub fn extract_title(page: &MarkupAccessor) -> String {
    run_chain("title", TITLE_CHAIN, page).unwrap_or_else(|| TITLE_NOT_FOUND.to_string())
}

/// Extracts the author, or the author sentinel
pub fn extract_author(page: &MarkupAccessor) -> String {
    run_chain("author", AUTHOR_CHAIN, page).unwrap_or_else(|| AUTHOR_NOT_FOUND.to_string())
}

/// Extracts the publication date, or the date sentinel
pub fn extract_date(page: &MarkupAccessor) -> String {
    run_chain("date", DATE_CHAIN, page).unwrap_or_else(|| DATE_NOT_FOUND.to_string())
}

/// Extracts the summary, or the summary sentinel
pub fn extract_summary(page: &MarkupAccessor) -> String {
    run_chain("summary", SUMMARY_CHAIN, page).unwrap_or_else(|| SUMMARY_NOT_FOUND.to_string())
}

/// Extracts the article body; empty when no container matched
pub fn extract_body(page: &MarkupAccessor) -> String {
    run_chain("body", BODY_CHAIN, page).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn page(html: &str) -> MarkupAccessor {
        MarkupAccessor::parse(html, Url::parse("https://example.com/a").unwrap())
    }

    #[test]
    fn test_title_from_og_title() {
        let p = page(r#"<html><head><meta property="og:title" content="Fed Raises Rates"><title>Site Name</title></head><body></body></html>"#);
        assert_eq!(extract_title(&p), "Fed Raises Rates");
    }

    #[test]
    fn test_malformed_strategy_falls_through() {
        let p = page("<html><body><h1>Headline</h1></body></html>");
        let chain = [
            Strategy::first("broken", "h1[::text"),
            Strategy::first("h1", "h1::text"),
        ];
        assert_eq!(chain[0].apply(&p), None);
        assert_eq!(run_chain("title", &chain, &p), Some("Headline".to_string()));
    }

    #[test]
    fn test_og_title_beats_h1() {
        let p = page(r#"<html><head><meta property="og:title" content="From OG"></head><body><h1>From H1</h1></body></html>"#);
        assert_eq!(extract_title(&p), "From OG");
    }

    #[test]
    fn test_title_from_h1() {
        let p = page("<html><head><title>Site Name</title></head><body><h1>  Headline\n Here </h1></body></html>");
        assert_eq!(extract_title(&p), "Headline Here");
    }

    #[test]
    fn test_title_from_title_tag() {
        let p = page("<html><head><title>Site Name</title></head><body></body></html>");
        assert_eq!(extract_title(&p), "Site Name");
    }

    #[test]
    fn test_title_sentinel() {
        let p = page("<html><head></head><body><p>nothing</p></body></html>");
        assert_eq!(extract_title(&p), TITLE_NOT_FOUND);
    }

    #[test]
    fn test_blank_og_title_falls_through() {
        let p = page(r#"<html><head><meta property="og:title" content="   "><title>Site Name</title></head></html>"#);
        assert_eq!(extract_title(&p), "Site Name");
        assert!(!is_article(&p));
    }

    #[test]
    fn test_author_chain_order() {
        let p = page(r#"<html><head>
            <meta property="article:author" content="Property Author">
            <meta name="author" content="Name Author">
            </head><body><span class="byline__name">Byline Author</span></body></html>"#);
        assert_eq!(extract_author(&p), "Name Author");

        let p = page(r#"<html><head><meta property="article:author" content="Property Author"></head>
            <body><span class="byline__name">Byline Author</span></body></html>"#);
        assert_eq!(extract_author(&p), "Property Author");
    }

    #[test]
    fn test_author_from_byline_union() {
        let p = page(r#"<html><body><div class="byline">By <a href="/staff/jd">Jane Doe</a></div></body></html>"#);
        assert_eq!(extract_author(&p), "Jane Doe");

        let p = page(r#"<html><body><a rel="author" href="/x">Rel Author</a><span class="author-name">Later</span></body></html>"#);
        assert_eq!(extract_author(&p), "Rel Author");
    }

    #[test]
    fn test_author_sentinel() {
        let p = page("<html><body></body></html>");
        assert_eq!(extract_author(&p), AUTHOR_NOT_FOUND);
    }

    #[test]
    fn test_date_chain() {
        let p = page(r#"<html><head><meta property="article:published_time" content="2024-05-01T08:00:00Z"></head>
            <body><time datetime="2024-04-30">Apr 30</time></body></html>"#);
        assert_eq!(extract_date(&p), "2024-05-01T08:00:00Z");

        let p = page(r#"<html><body><time datetime="2024-04-30">Apr 30</time></body></html>"#);
        assert_eq!(extract_date(&p), "2024-04-30");

        let p = page(r#"<html><head><meta name="date" content="2024-01-01"><meta name="cXenseParse:recs:publishtime" content="2024-02-02"></head></html>"#);
        assert_eq!(extract_date(&p), "2024-02-02");

        let p = page(r#"<html><head><meta name="date" content="2024-01-01"></head></html>"#);
        assert_eq!(extract_date(&p), "2024-01-01");

        let p = page("<html></html>");
        assert_eq!(extract_date(&p), DATE_NOT_FOUND);
    }

    #[test]
    fn test_summary_chain() {
        let p = page(r#"<html><head><meta name="description" content="Generic"><meta property="og:description" content="Open Graph"></head></html>"#);
        assert_eq!(extract_summary(&p), "Open Graph");

        let p = page(r#"<html><head><meta name="description" content=" Generic  one "></head></html>"#);
        assert_eq!(extract_summary(&p), "Generic one");

        let p = page(r#"<html><body><div itemprop="description">Item summary</div></body></html>"#);
        assert_eq!(extract_summary(&p), "Item summary");

        let p = page("<html></html>");
        assert_eq!(extract_summary(&p), SUMMARY_NOT_FOUND);
    }

    #[test]
    fn test_body_joins_container_paragraphs() {
        let p = page(r#"<html><body>
            <div class="article-body"><p>First  paragraph.</p><p>Second
            paragraph.</p></div>
            <p>Outside.</p>
        </body></html>"#);
        assert_eq!(extract_body(&p), "First paragraph. Second paragraph.");
    }

    #[test]
    fn test_body_union_is_document_order() {
        let p = page(r#"<html><body>
            <div class="story-content"><p>One.</p></div>
            <div class="entry-content"><p>Two.</p></div>
        </body></html>"#);
        assert_eq!(extract_body(&p), "One. Two.");
    }

    #[test]
    fn test_body_from_item_prop() {
        let p = page(r#"<html><body><section itemprop="articleBody"><p>Body text.</p></section></body></html>"#);
        assert_eq!(extract_body(&p), "Body text.");
    }

    #[test]
    fn test_body_falls_back_to_article_like_divs() {
        let p = page(r#"<html><body><div id="main-article-text"><p>Fallback.</p></div><div class="sidebar"><p>No.</p></div></body></html>"#);
        assert_eq!(extract_body(&p), "Fallback.");

        let p = page(r#"<html><body><div class="top-story"><p>Story div.</p></div></body></html>"#);
        assert_eq!(extract_body(&p), "Story div.");
    }

    #[test]
    fn test_body_empty() {
        let p = page("<html><body><p>Loose paragraph.</p></body></html>");
        assert_eq!(extract_body(&p), "");
    }

    #[test]
    fn test_is_article() {
        assert!(is_article(&page(r#"<html><head><meta property="og:title" content="T"></head></html>"#)));
        assert!(!is_article(&page("<html><body><h1>T</h1></body></html>")));
    }
}
