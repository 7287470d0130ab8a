//! Field extraction for article pages
//!
//! Every field is pulled by an ordered chain of [`Strategy`] values, all of which
//! read the page through a [`MarkupAccessor`]. See [`fields`] for the chains.

pub mod fields;
mod text;

pub use fields::{
    extract_author, extract_body, extract_date, extract_summary, extract_title, is_article,
    Pick, Strategy, AUTHOR_NOT_FOUND, DATE_NOT_FOUND, SUMMARY_NOT_FOUND, TITLE_NOT_FOUND,
};
pub use text::clean_text;

use crate::markup::MarkupAccessor;

/// Everything the field extractor found on one page
///
/// Title, author, date and summary hold either a non-empty value or their sentinel.
/// The body is empty when no container matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedFields {
    pub title: String,
    pub author: String,
    pub date: String,
    pub summary: String,
    pub body: String,
}

impl ExtractedFields {
    /// Runs every field chain against a page
    pub fn from_page(page: &MarkupAccessor) -> Self {
        Self {
            title: extract_title(page),
            author: extract_author(page),
            date: extract_date(page),
            summary: extract_summary(page),
            body: extract_body(page),
        }
    }

    /// Returns true if a title strategy succeeded
    pub fn has_title(&self) -> bool {
        !self.title.is_empty() && self.title != TITLE_NOT_FOUND
    }

    /// Length of the normalized body in characters
    pub fn body_len(&self) -> usize {
        self.body.chars().count()
    }
}
