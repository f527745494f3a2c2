//! Fossen main entry point
//!
//! This is the command-line interface for the Fossen crawler and index.

use anyhow::Context;
use clap::Parser;
use fossen::config::{compute_config_hash, load_config_or_default, Config};
use fossen::crawler::HttpFetcher;
use fossen::index::{index_channel, run_index_writer, PersistReport};
use fossen::output::{print_index_summary, print_search_results, print_statistics};
use fossen::{Crawler, Indexer};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Fossen: a web crawler with a searchable TF-IDF index
///
/// Fossen crawls outward from a set of start URLs, honoring host blacklists,
/// crawling zones and scheme filters, and indexes the text of every page it
/// loads. The index is saved to disk when the session ends and can be
/// searched afterwards.
#[derive(Parser, Debug)]
#[command(name = "fossen")]
#[command(version)]
#[command(about = "A web crawler with a searchable TF-IDF index", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG", default_value = "fossen.toml")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Start from an empty index instead of loading the saved one
    #[arg(long, conflicts_with_all = ["search", "stats"])]
    fresh: bool,

    /// Search the saved index for pages containing every word and exit
    #[arg(long, value_name = "WORD", num_args = 1.., conflicts_with = "stats")]
    search: Option<Vec<String>>,

    /// Show the size of the saved index and exit
    #[arg(long)]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = load_config_or_default(&cli.config);
    match compute_config_hash(&cli.config) {
        Ok(hash) => tracing::info!("Configuration hash: {}", hash),
        Err(e) => tracing::debug!("No configuration hash: {}", e),
    }

    let mut indexer = Indexer::with_database_directory(&config.index.database_directory);
    if !cli.fresh {
        load_index(&mut indexer);
    }

    if let Some(words) = cli.search {
        handle_search(&indexer, &words);
    } else if cli.stats {
        print_index_summary(&indexer);
    } else {
        handle_crawl(config, indexer).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("fossen=info,warn"),
            1 => EnvFilter::new("fossen=debug,info"),
            2 => EnvFilter::new("fossen=trace,debug"),
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

/// Loads the saved index, if its directory exists
///
/// Files that fail to load leave their part of the index empty.
fn load_index(indexer: &mut Indexer) {
    let Some(directory) = indexer.database_directory().map(Path::to_path_buf) else {
        return;
    };
    if !directory.is_dir() {
        tracing::info!("No saved index at {}", directory.display());
        return;
    }

    let report = indexer.load();
    log_report("load", &report);
    tracing::info!(
        "Loaded index: {} words, {} pages",
        indexer.word_count(),
        indexer.page_count()
    );
}

fn log_report(action: &str, report: &PersistReport) {
    for file in &report.completed {
        tracing::debug!("Index {} ok: {}", action, file);
    }
    for (file, error) in &report.failures {
        tracing::warn!("Index {} failed for {}: {}", action, file, error);
    }
}

/// Handles --search: prints ranked results from the saved index
fn handle_search(indexer: &Indexer, words: &[String]) {
    let results = indexer.search_ranked(words);
    print_search_results(words, &results);
}

/// Handles the main crawl operation
///
/// The crawler feeds a single index writer task. Ctrl-C stops the crawler;
/// the index is saved once the writer has applied every pending update.
async fn handle_crawl(config: Config, indexer: Indexer) -> anyhow::Result<()> {
    tracing::info!(
        "Start URLs: {}, blacklisted hosts: {}, crawling zones: {}",
        config.crawler.start_urls.len(),
        config.crawler.blacklisted_hosts.len(),
        config.crawler.crawling_zones.len()
    );

    let fetcher = HttpFetcher::new(&config.fetcher).context("Failed to build HTTP client")?;

    let (sender, receiver) = index_channel();
    let writer = tokio::spawn(run_index_writer(indexer, receiver));

    let mut crawler = Crawler::new(&config.crawler, fetcher, sender);
    let handle = crawler.handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, stopping crawl");
            handle.stop();
        }
    });

    let statistics = crawler.run().await;

    // Closes the channel so the writer can finish
    drop(crawler);
    let indexer = writer.await.context("Index writer task failed")?;

    let report = indexer.save();
    log_report("save", &report);
    if report.is_complete() {
        tracing::info!(
            "Saved index: {} words, {} pages",
            indexer.word_count(),
            indexer.page_count()
        );
    }

    print_statistics(&statistics);
    Ok(())
}
