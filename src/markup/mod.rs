//! Markup access for fetched pages
//!
//! This module wraps a fetched page's markup and offers the two query dialects the
//! extractors are written in:
//! - structural paths (`//meta[@property="og:title"]/@content`)
//! - shorthand selectors (`h1::text`, `time::attr(datetime)`)
//!
//! Both return an ordered list of strings and never fail.

mod accessor;
mod page;
mod query;

pub use accessor::MarkupAccessor;
pub use page::PageContext;
pub use query::{Query, Terminal};
