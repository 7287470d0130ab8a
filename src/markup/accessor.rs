use crate::markup::query::Query;
use crate::ParseError;
use scraper::Html;
use url::Url;

/// Read-only query access to one page's markup
///
/// Every extraction strategy goes through this type; nothing else touches the raw
/// markup. Queries never fail: a malformed selector is logged and yields no values.
/// [`MarkupAccessor::try_query`] surfaces the error instead; field strategies use it
/// so the failing strategy can be named.
pub struct MarkupAccessor {
    document: Html,
    base_url: Url,
}

impl MarkupAccessor {
    /// Parses markup fetched from `base_url`
    ///
    /// HTML parsing is error-tolerant: malformed markup still produces a document.
    pub fn parse(markup: &str, base_url: Url) -> Self {
        Self {
            document: Html::parse_document(markup),
            base_url,
        }
    }

    /// The URL relative links are resolved against
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Runs a structural path query (e.g. `//meta[@name="author"]/@content`)
    pub fn path(&self, expr: &str) -> Vec<String> {
        match Query::path(expr) {
            Ok(query) => query.evaluate(self.document.root_element()),
            Err(e) => self.skip_selector(expr, e),
        }
    }

    /// Runs a shorthand query (e.g. `h1::text`, `time::attr(datetime)`)
    pub fn select(&self, expr: &str) -> Vec<String> {
        match Query::shorthand(expr) {
            Ok(query) => query.evaluate(self.document.root_element()),
            Err(e) => self.skip_selector(expr, e),
        }
    }

    /// Runs a query in whichever dialect `expr` is written in
    pub fn query(&self, expr: &str) -> Vec<String> {
        if Query::is_path(expr) {
            self.path(expr)
        } else {
            self.select(expr)
        }
    }

    /// Runs a query, surfacing selector errors
    pub fn try_query(&self, expr: &str) -> Result<Vec<String>, ParseError> {
        Ok(Query::parse(expr)?.evaluate(self.document.root_element()))
    }

    /// Resolves a link against the page URL
    ///
    /// Returns None when the link cannot be joined to the page URL.
    pub fn resolve(&self, link: &str) -> Option<Url> {
        self.base_url.join(link.trim()).ok()
    }

    fn skip_selector(&self, expr: &str, error: ParseError) -> Vec<String> {
        tracing::warn!(selector = expr, page = %self.base_url, "Skipping selector: {}", error);
        Vec::new()
    }
}
