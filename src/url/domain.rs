use url::Url;

/// Extracts the page domain from a URL
///
/// The domain is the lowercase host with a single leading `www.` removed. Two URLs
/// are on the same site exactly when their page domains are equal; the port is not
/// part of the domain.
///
/// # Arguments
///
/// * `url` - The URL to extract the domain from
///
/// # Returns
///
/// * `Some(String)` - The page domain
/// * `None` - If the URL has no host
///
/// # Examples
///
/// ```
/// use url::Url;
/// use news_ripple::url::page_domain;
///
/// let url = Url::parse("https://www.Example.com/path").unwrap();
/// assert_eq!(page_domain(&url), Some("example.com".to_string()));
///
/// let url = Url::parse("https://finance.yahoo.com/").unwrap();
/// assert_eq!(page_domain(&url), Some("finance.yahoo.com".to_string()));
/// ```
pub fn page_domain(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_lowercase();
    match host.strip_prefix("www.") {
        Some(rest) if !rest.is_empty() => Some(rest.to_string()),
        _ => Some(host),
    }
}

/// Checks whether a host belongs to a site domain
///
/// A host is within `domain` when it is the domain itself or any subdomain of it:
/// `finance.yahoo.com` is within `yahoo.com`, `notyahoo.com` is not.
///
/// # Examples
///
/// ```
/// use news_ripple::url::is_within_domain;
///
/// assert!(is_within_domain("yahoo.com", "yahoo.com"));
/// assert!(is_within_domain("finance.yahoo.com", "yahoo.com"));
/// assert!(!is_within_domain("notyahoo.com", "yahoo.com"));
/// ```
pub fn is_within_domain(host: &str, domain: &str) -> bool {
    let host = host.to_ascii_lowercase();
    let domain = domain.to_ascii_lowercase();
    host == domain || host.ends_with(&format!(".{}", domain))
}
