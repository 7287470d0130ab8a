//! Output module for article records and run statistics
//!
//! This module handles:
//! - The sink interface records are written through
//! - JSON Lines and in-memory sinks
//! - Crawl statistics and their printed report

mod json;
pub mod stats;
mod traits;

pub use json::JsonLinesSink;
pub use stats::{print_statistics, CrawlStats};
pub use traits::{ArticleSink, MemorySink, SinkError, SinkResult};
