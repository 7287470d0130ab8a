//! Outbound link extraction
//!
//! # Link Extraction Rules
//!
//! **Include:**
//! - `<a href="...">` tags anywhere in the document
//! - `<link rel="canonical" href="...">`
//!
//! **Exclude:**
//! - `<a href="..." download>`
//! - `javascript:`, `mailto:`, `tel:` links
//! - Data URIs
//! - Fragment-only links (same page anchors)
//! - Anything that is not HTTP(S) after resolution
//!
//! `rel="nofollow"` links are followed.

use crate::markup::MarkupAccessor;
use std::collections::HashSet;
use url::Url;

const LINK_QUERY: &str =
    r#"a[href]:not([download])::attr(href), link[rel="canonical"][href]::attr(href)"#;

const SKIPPED_SCHEMES: [&str; 4] = ["javascript:", "mailto:", "tel:", "data:"];

/// Extracts every followable link of a page as an absolute URL
///
/// Links are returned in document order, each at most once.
///
/// # Example
///
/// ```
/// use news_ripple::crawler::extract_links;
/// use news_ripple::MarkupAccessor;
/// use url::Url;
///
/// let html = r#"<html><body><a href="/page">Link</a></body></html>"#;
/// let page = MarkupAccessor::parse(html, Url::parse("https://example.com/").unwrap());
/// let links = extract_links(&page);
/// assert_eq!(links[0].as_str(), "https://example.com/page");
/// ```
pub fn extract_links(page: &MarkupAccessor) -> Vec<Url> {
    let mut seen = HashSet::new();
    page.query(LINK_QUERY)
        .iter()
        .filter_map(|href| resolve_link(page, href))
        .filter(|url| seen.insert(url.clone()))
        .collect()
}

/// Resolves a link href against the page and validates it
fn resolve_link(page: &MarkupAccessor, href: &str) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if SKIPPED_SCHEMES.iter().any(|scheme| lower.starts_with(scheme)) {
        return None;
    }

    let mut url = page.resolve(href)?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return None;
    }
    url.set_fragment(None);
    Some(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn links(html: &str) -> Vec<String> {
        let page = MarkupAccessor::parse(html, Url::parse("https://example.com/page").unwrap());
        extract_links(&page).into_iter().map(String::from).collect()
    }

    #[test]
    fn test_extract_absolute_link() {
        let links = links(r#"<html><body><a href="https://other.com/page">Link</a></body></html>"#);
        assert_eq!(links, vec!["https://other.com/page"]);
    }

    #[test]
    fn test_extract_relative_link() {
        let links = links(r#"<html><body><a href="/other">Link</a></body></html>"#);
        assert_eq!(links, vec!["https://example.com/other"]);
    }

    #[test]
    fn test_extract_relative_path_link() {
        let links = links(r#"<html><body><a href="other">Link</a></body></html>"#);
        assert_eq!(links, vec!["https://example.com/other"]);
    }

    #[test]
    fn test_skip_special_schemes() {
        let html = r#"<html><body>
            <a href="javascript:void(0)">JS</a>
            <a href="JavaScript:void(0)">JS</a>
            <a href="mailto:test@example.com">Email</a>
            <a href="tel:+1234567890">Call</a>
            <a href="data:text/html,<h1>Test</h1>">Data</a>
            <a href="ftp://example.com/file">FTP</a>
        </body></html>"#;
        assert!(links(html).is_empty());
    }

    #[test]
    fn test_skip_download_link() {
        let links = links(r#"<html><body><a href="/file.pdf" download>Download</a></body></html>"#);
        assert!(links.is_empty());
    }

    #[test]
    fn test_skip_fragment_only() {
        let links = links(r##"<html><body><a href="#section">Jump</a></body></html>"##);
        assert!(links.is_empty());
    }

    #[test]
    fn test_fragment_is_dropped() {
        let links = links(r##"<html><body><a href="/news/a#comments">A</a></body></html>"##);
        assert_eq!(links, vec!["https://example.com/news/a"]);
    }

    #[test]
    fn test_follow_nofollow_links() {
        let links = links(r#"<html><body><a href="/page2" rel="nofollow">Link</a></body></html>"#);
        assert_eq!(links, vec!["https://example.com/page2"]);
    }

    #[test]
    fn test_extract_canonical_link() {
        let html = r#"<html><head><link rel="canonical" href="https://example.com/canonical" /><link rel="stylesheet" href="/style.css"></head><body></body></html>"#;
        assert_eq!(links(html), vec!["https://example.com/canonical"]);
    }

    #[test]
    fn test_duplicates_are_removed() {
        let html = r#"<html><body>
            <a href="/page1">Link 1</a>
            <a href="/page2">Link 2</a>
            <a href="https://example.com/page1">Link 1 again</a>
            <a href="https://other.com/page3">Link 3</a>
        </body></html>"#;
        assert_eq!(
            links(html),
            vec![
                "https://example.com/page1",
                "https://example.com/page2",
                "https://other.com/page3"
            ]
        );
    }

    #[test]
    fn test_mixed_valid_and_invalid_links() {
        let html = r#"
            <html>
            <body>
                <a href="/valid">Valid</a>
                <a href="javascript:alert('no')">Invalid</a>
                <a href="mailto:test@example.com">Invalid</a>
                <a href="/another-valid">Valid</a>
            </body>
            </html>
        "#;
        assert_eq!(links(html).len(), 2);
    }
}
