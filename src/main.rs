//! News-Ripple main entry point
//!
//! This is the command-line interface for the News-Ripple article crawler.

use anyhow::Context;
use clap::Parser;
use news_ripple::config::{apply_overrides, load_config_with_hash, Config};
use news_ripple::crawler::crawl;
use news_ripple::output::{print_statistics, JsonLinesSink};
use std::path::PathBuf;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

/// News-Ripple: a domain-scoped news crawler
///
/// News-Ripple crawls a fixed set of news sites from their start pages, stays on
/// each site, and writes one JSON record per extracted article.
#[derive(Parser, Debug)]
#[command(name = "news-ripple")]
#[command(version)]
#[command(about = "A domain-scoped news article crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,

    /// Override the configured depth limit
    #[arg(long, value_name = "DEPTH")]
    depth_limit: Option<u32>,

    /// Override the configured output file
    #[arg(short, long, value_name = "PATH")]
    output: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    let config = apply_overrides(config, cli.depth_limit, cli.output)
        .context("Invalid command-line override")?;

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    handle_crawl(config).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("news_ripple=info,warn"),
            1 => EnvFilter::new("news_ripple=debug,info"),
            2 => EnvFilter::new("news_ripple=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the validated config and seed plan
fn handle_dry_run(config: &Config) {
    println!("=== News-Ripple Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Depth limit: {}", config.crawler.depth_limit);
    println!(
        "  Requests per domain: {}",
        config.crawler.concurrent_requests_per_domain
    );
    println!(
        "  Max concurrent requests: {}",
        config.crawler.max_concurrent_requests
    );
    println!("  Request delay: {}ms", config.crawler.request_delay);

    println!("\nFetch:");
    println!("  User agent: {}", config.fetch.user_agent);
    println!("  Timeout: {}s", config.fetch.timeout);
    println!("  Max redirects: {}", config.fetch.max_redirects);

    println!("\nOutput:");
    println!("  Records: {}", config.output.path);

    println!("\nSeed Sites ({}):", config.seeds.len());
    for seed in &config.seeds {
        println!("  - {} -> {}", seed.domain, seed.start_url);
    }

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would start crawling {} sites at depth limit {}",
        config.seeds.len(),
        config.crawler.depth_limit
    );
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config) -> anyhow::Result<()> {
    tracing::info!(
        "Seed sites: {}, writing records to {}",
        config.seeds.len(),
        config.output.path
    );

    let sink = JsonLinesSink::create(&config.output.path)
        .with_context(|| format!("Failed to open output {}", config.output.path))?;

    // Ctrl-C closes the task intake; in-flight pages still finish
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing in-flight pages");
            let _ = shutdown_tx.send(true);
        }
    });

    let (stats, sink) = crawl(&config, sink, shutdown_rx)
        .await
        .context("Crawl failed")?;

    tracing::info!("Wrote {} records to {}", sink.written(), config.output.path);
    print_statistics(&stats);

    Ok(())
}
