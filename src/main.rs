//! Sitemap-Warmer main entry point
//!
//! This is the command-line interface for the Sitemap-Warmer cache primer.

use clap::Parser;
use sitemap_warmer::config::{load_config_with_hash, validate, Config};
use sitemap_warmer::crawler::Warmer;
use sitemap_warmer::output::print_summary;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Number of URLs shown by --dry-run
const DRY_RUN_SAMPLE: usize = 10;

/// Sitemap-Warmer: prime a CDN from a website's sitemaps
///
/// Sitemap-Warmer fetches every document listed in a sitemap hierarchy
/// through a bounded pool of workers, retries failures once, and can ping
/// a search engine when done.
#[derive(Parser, Debug)]
#[command(name = "sitemap-warmer")]
#[command(version)]
#[command(about = "Prime a CDN from a website's sitemaps", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG", required_unless_present = "sitemap_url")]
    config: Option<PathBuf>,

    /// Root sitemap URL (overrides the config file)
    #[arg(long, value_name = "URL")]
    sitemap_url: Option<String>,

    /// Number of concurrent fetch workers
    #[arg(short, long)]
    concurrency: Option<u32>,

    /// Maximum number of documents to fetch (0 = unlimited)
    #[arg(short, long)]
    limit: Option<usize>,

    /// Skip the retry pass over failed documents
    #[arg(long)]
    no_retry: bool,

    /// Ping the search engine once the run is complete
    #[arg(long)]
    notify: bool,

    /// Also warm alternate-language links
    #[arg(long)]
    alternates: bool,

    /// Exit with an error if documents still fail after the retry pass
    #[arg(long)]
    fail_on_errors: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Resolve the sitemaps and show what would be fetched without fetching it
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e);
        }
    };

    if cli.dry_run {
        handle_dry_run(config).await
    } else {
        handle_warm(config).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sitemap_warmer=info,warn"),
            1 => EnvFilter::new("sitemap_warmer=debug,info"),
            2 => EnvFilter::new("sitemap_warmer=trace,debug"),
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

/// Loads the config file (if any) and applies command-line overrides
fn build_config(cli: &Cli) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = match (&cli.config, &cli.sitemap_url) {
        (Some(path), _) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        (None, Some(url)) => Config::from_sitemap_url(url.clone()),
        (None, None) => return Err("either CONFIG or --sitemap-url is required".into()),
    };

    if let Some(url) = &cli.sitemap_url {
        config.warmer.sitemap_url = url.clone();
    }
    if let Some(concurrency) = cli.concurrency {
        config.warmer.concurrency = concurrency;
    }
    if let Some(limit) = cli.limit {
        config.warmer.limit = limit;
    }
    if cli.no_retry {
        config.warmer.retry = false;
    }
    if cli.notify {
        config.warmer.notify = true;
    }
    if cli.alternates {
        config.warmer.alternates = true;
    }
    if cli.fail_on_errors {
        config.warmer.fail_on_errors = true;
    }

    validate(&config)?;
    Ok(config)
}

/// Handles the --dry-run mode: resolves the sitemaps and lists a sample
async fn handle_dry_run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Sitemap-Warmer Dry Run ===\n");

    println!("Warmer Configuration:");
    println!("  Sitemap: {}", config.warmer.sitemap_url);
    println!("  Concurrency: {}", config.warmer.concurrency);
    println!("  Limit: {}", config.warmer.limit);
    println!("  Retry: {}", config.warmer.retry);
    println!("  Notify: {}", config.warmer.notify);
    println!("  Alternates: {}", config.warmer.alternates);
    println!("  Request timeout: {}s", config.warmer.request_timeout);
    println!("  User agent: {}", config.user_agent_string());
    println!();

    let warmer = Warmer::new(config)?;
    let resolution = warmer.resolve().await?;

    println!(
        "Child sitemaps: {} ({} skipped)",
        resolution.child_sitemaps, resolution.skipped_sitemaps
    );
    println!("URLs discovered: {}", resolution.discovered);
    println!("\nSample of documents ({} total):", resolution.documents.len());
    for url in resolution.documents.iter().take(DRY_RUN_SAMPLE) {
        println!("  * {}", url);
    }

    println!(
        "\n✓ Would fetch {} documents",
        resolution.documents.len()
    );

    Ok(())
}

/// Handles the main warm operation
async fn handle_warm(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let fail_on_errors = config.warmer.fail_on_errors;

    let warmer = Warmer::new(config)?;
    let summary = match warmer.run().await {
        Ok(summary) => summary,
        Err(e) => {
            tracing::error!("Warm failed: {}", e);
            return Err(e.into());
        }
    };

    print_summary(&summary);

    let remaining = summary.remaining_failures().len();
    if fail_on_errors && remaining > 0 {
        return Err(format!("{} documents still failing after the run", remaining).into());
    }

    Ok(())
}
