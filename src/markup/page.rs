use crate::markup::MarkupAccessor;
use crate::url::page_domain;
use crate::ParseError;
use url::Url;

/// One fetched response, ready for querying
///
/// Lives for the processing of a single page and is dropped afterwards.
#[derive(Debug, Clone)]
pub struct PageContext {
    /// URL the response was served from, after redirects
    pub final_url: Url,

    /// Page domain of `final_url` (lowercase, leading `www.` stripped)
    pub domain: String,

    /// The markup as fetched
    pub raw_markup: String,
}

impl PageContext {
    /// Builds a page context from a fetch result
    ///
    /// Fails when the final URL does not parse or has no host.
    pub fn new(final_url: &str, raw_markup: String) -> Result<Self, ParseError> {
        let url = Url::parse(final_url).map_err(|e| ParseError::InvalidUrl {
            url: final_url.to_string(),
            message: e.to_string(),
        })?;
        let domain =
            page_domain(&url).ok_or_else(|| ParseError::MissingDomain(final_url.to_string()))?;

        Ok(Self {
            final_url: url,
            domain,
            raw_markup,
        })
    }

    /// Parses the markup into a queryable accessor
    pub fn accessor(&self) -> MarkupAccessor {
        MarkupAccessor::parse(&self.raw_markup, self.final_url.clone())
    }
}
