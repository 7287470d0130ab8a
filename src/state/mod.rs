//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `TaskState`: Where a crawl task is in its lifecycle (pending, dispatched, fetched, ...)
//! - `DomainState`: Per-domain request spacing used by the politeness gate

mod domain_state;
mod task_state;

// Re-export main types
pub use domain_state::DomainState;
pub use task_state::TaskState;
