//! URL handling module for News-Ripple
//!
//! This module provides page-domain extraction, site membership checks and the URL
//! normalization used as the visited-set key.

mod domain;
mod normalize;

pub use domain::{is_within_domain, page_domain};
pub use normalize::normalize_url;
