//! Configuration module for News-Ripple
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use news_ripple::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("news.toml")).unwrap();
//! println!("Crawler will follow links {} deep", config.crawler.depth_limit);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, FetchConfig, OutputConfig, SeedEntry};

// Re-export parser functions
pub use parser::{
    apply_overrides, compute_config_hash, load_config, load_config_with_hash, parse_config,
};
