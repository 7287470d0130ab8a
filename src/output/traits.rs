//! Sink traits and errors
//!
//! A sink receives finished article records. The crawl loop owns its sink and calls
//! it from a single task, so implementations need not be thread-safe.

use crate::record::ArticleRecord;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors that can occur while writing records
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize record: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for sink operations
pub type SinkResult<T> = Result<T, SinkError>;

/// Destination for article records
pub trait ArticleSink: Send {
    /// Writes one record
    fn emit(&mut self, record: &ArticleRecord) -> SinkResult<()>;

    /// Flushes buffered records; called once at the end of a run
    fn flush(&mut self) -> SinkResult<()> {
        Ok(())
    }
}

impl<S: ArticleSink + ?Sized> ArticleSink for Box<S> {
    fn emit(&mut self, record: &ArticleRecord) -> SinkResult<()> {
        (**self).emit(record)
    }

    fn flush(&mut self) -> SinkResult<()> {
        (**self).flush()
    }
}

/// Collects records in memory
///
/// Clones share the same buffer, so a caller can keep a handle while the crawl owns
/// the sink.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    records: Arc<Mutex<Vec<ArticleRecord>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every record emitted so far
    pub fn records(&self) -> Vec<ArticleRecord> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|records| records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ArticleSink for MemorySink {
    fn emit(&mut self, record: &ArticleRecord) -> SinkResult<()> {
        if let Ok(mut records) = self.records.lock() {
            records.push(record.clone());
        }
        Ok(())
    }
}
