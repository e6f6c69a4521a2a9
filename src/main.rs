//! Catalog-Sweep main entry point
//!
//! This is the command-line interface for the Catalog-Sweep book catalog scraper.

use catalog_sweep::config::{load_config_with_hash, Config, MalformedCardPolicy};
use catalog_sweep::crawler::Coordinator;
use catalog_sweep::output::{load_statistics, print_statistics, write_catalog_json};
use catalog_sweep::storage::{finish_run, open_storage, SqliteStorage, Storage};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Catalog-Sweep: a book catalog scraper
///
/// Catalog-Sweep discovers every category of an online book store, walks
/// each category's listing pages and stores the numbered catalog in SQLite.
#[derive(Parser, Debug)]
#[command(name = "catalog-sweep")]
#[command(version = "1.0.0")]
#[command(about = "A book catalog scraper", long_about = None)]
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

    /// Validate config and show what would be scraped without scraping
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,

    /// Scrape without writing to the database
    #[arg(long, conflicts_with_all = ["dry_run", "stats"])]
    no_store: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        handle_dry_run(&config)?;
    } else if cli.stats {
        handle_stats(&config)?;
    } else {
        handle_scrape(&config, &config_hash, !cli.no_store).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("catalog_sweep=info,warn"),
            1 => EnvFilter::new("catalog_sweep=debug,info"),
            2 => EnvFilter::new("catalog_sweep=trace,debug"),
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

/// Handles the --dry-run mode: validates config and shows what would be scraped
fn handle_dry_run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Catalog-Sweep Dry Run ===\n");

    println!("Site:");
    println!("  Base URL: {}", config.site.base_url);

    println!("\nFetcher:");
    println!("  Timeout: {}s", config.fetcher.timeout_secs);
    println!("  Connect timeout: {}s", config.fetcher.connect_timeout_secs);
    println!("  Max retries: {}", config.fetcher.max_retries);
    println!("  Retry delay: {}ms", config.fetcher.retry_delay_ms);
    println!("  Request delay: {}ms", config.fetcher.request_delay_ms);

    println!("\nUser Agent:");
    println!("  Name: {}", config.user_agent.crawler_name);
    println!("  Version: {}", config.user_agent.crawler_version);
    println!("  Contact URL: {}", config.user_agent.contact_url);
    println!("  Contact Email: {}", config.user_agent.contact_email);

    println!("\nExtraction:");
    let policy = match config.extraction.malformed_card {
        MalformedCardPolicy::Abort => "abort on first malformed card",
        MalformedCardPolicy::Skip => "skip malformed cards",
    };
    println!("  Malformed cards: {}", policy);

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);
    match &config.output.json_path {
        Some(path) => println!("  JSON: {}", path),
        None => println!("  JSON: (disabled)"),
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would start scraping at {}", config.site.base_url);

    Ok(())
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("Database: {}\n", config.output.database_path);

    let storage = SqliteStorage::new(Path::new(&config.output.database_path))?;
    let stats = load_statistics(&storage)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the main scrape operation
async fn handle_scrape(
    config: &Config,
    config_hash: &str,
    store: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let coordinator = Coordinator::from_config(config)?;

    let mut storage = if store {
        let mut storage = open_storage(Path::new(&config.output.database_path))?;
        let run_id = storage.create_run(config_hash)?;
        tracing::info!("Started run {}", run_id);
        Some((storage, run_id))
    } else {
        tracing::info!("Storage disabled, catalog will not be written to the database");
        None
    };

    let run = match coordinator.run().await {
        Ok(run) => run,
        Err(e) => {
            tracing::error!("Scrape failed: {}", e);
            if let Some((storage, run_id)) = storage.as_mut() {
                storage.fail_run(*run_id)?;
            }
            return Err(e.into());
        }
    };
    tracing::debug!("Categories: {}", run.categories.names().join(", "));

    if let Some((storage, run_id)) = storage.as_mut() {
        let report = finish_run(storage, *run_id, &run.books)?;
        tracing::info!(
            "{} books processed, {} failures",
            report.saved.len(),
            report.failures.len()
        );
    }

    if let Some(json_path) = &config.output.json_path {
        write_catalog_json(&run.books, Path::new(json_path))?;
    }

    tracing::info!(
        "Scraped {} books from {} categories ({} pages, {} cards skipped)",
        run.books.len(),
        run.categories.len(),
        run.pages_fetched,
        run.skipped.len()
    );

    Ok(())
}
