//! Article records and the validation gate in front of them

use crate::extract::ExtractedFields;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Minimum normalized body length, in characters, for a page to count as an article
pub const MIN_BODY_CHARS: usize = 200;

/// One extracted article, as handed to the sink
///
/// Serialized as a flat JSON object of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRecord {
    /// SHA-256 hex digest of the normalized title
    pub id: String,
    pub url: String,
    pub title: String,
    pub text: String,
    pub author: String,
    pub date: String,
    pub summary: String,
}

/// Why a page was not turned into a record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationFailure {
    #[error("no title found")]
    MissingTitle,

    #[error("body too short ({len} chars, need {MIN_BODY_CHARS})")]
    BodyTooShort { len: usize },
}

/// Computes a record id from a normalized title
///
/// Two pages with the same normalized title get the same id.
pub fn record_id(title: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(title.as_bytes());
    hex::encode(hasher.finalize())
}

/// Validates extracted fields and assembles the record
pub fn build_record(url: &str, fields: &ExtractedFields) -> Result<ArticleRecord, ValidationFailure> {
    if !fields.has_title() {
        return Err(ValidationFailure::MissingTitle);
    }

    let len = fields.body_len();
    if len < MIN_BODY_CHARS {
        return Err(ValidationFailure::BodyTooShort { len });
    }

    Ok(ArticleRecord {
        id: record_id(&fields.title),
        url: url.to_string(),
        title: fields.title.clone(),
        text: fields.body.clone(),
        author: fields.author.clone(),
        date: fields.date.clone(),
        summary: fields.summary.clone(),
    })
}
