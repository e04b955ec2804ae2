//! Plotfetch main entry point
//!
//! This is the command-line interface for the plotfetch article crawler.

use clap::Parser;
use plotfetch::config::load_config_with_hash;
use plotfetch::crawler::crawl;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Plotfetch: a recursive article crawler
///
/// Plotfetch fetches encyclopedia-style articles starting from a seed
/// identifier, extracts plot summaries and attribute fields, follows
/// outbound article links, and persists everything as it goes so an
/// interrupted crawl resumes where it left off.
#[derive(Parser, Debug)]
#[command(name = "plotfetch")]
#[command(version = "1.0.0")]
#[command(about = "A recursive article crawler", long_about = None)]
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

    /// Override the seed article identifier from the config
    #[arg(long, value_name = "IDENTIFIER")]
    seed: Option<String>,

    /// Override the item budget from the config
    #[arg(long, value_name = "N")]
    max_items: Option<usize>,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long, conflicts_with_all = ["stats", "history"])]
    dry_run: bool,

    /// Show completion statistics from the store and exit
    #[arg(long, conflicts_with_all = ["dry_run", "history"])]
    stats: bool,

    /// Show the link discovery history from the store and exit
    #[arg(long, conflicts_with_all = ["dry_run", "stats"])]
    history: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, _config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    // Apply command-line overrides
    if let Some(seed) = cli.seed {
        tracing::info!("Seed overridden from command line: {}", seed);
        config.crawler.seed = seed;
    }
    if let Some(max_items) = cli.max_items {
        tracing::info!("Item budget overridden from command line: {}", max_items);
        config.crawler.max_items = max_items;
    }

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.stats {
        handle_stats(&config)?;
    } else if cli.history {
        handle_history(&config)?;
    } else {
        handle_crawl(config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("plotfetch=info,warn"),
            1 => EnvFilter::new("plotfetch=debug,info"),
            2 => EnvFilter::new("plotfetch=trace,debug"),
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

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &plotfetch::Config) {
    println!("=== Plotfetch Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Seed article: {}", config.crawler.seed);
    println!("  Item budget: {}", config.crawler.max_items);
    println!("  Safety depth: {}", config.crawler.max_safety_depth);
    if config.crawler.process_all_links {
        println!("  Links per article: all");
    } else {
        println!("  Links per article: {}", config.crawler.max_links_per_item);
    }
    println!("  Courtesy delay: {}ms", config.crawler.courtesy_delay_ms);
    println!("  Prevent cycles: {}", config.crawler.prevent_cycles);
    println!("  Prevent duplicates: {}", config.crawler.prevent_duplicates);

    println!("\nSource:");
    println!("  Base URL: {}", config.source.base_url);

    println!("\nUser Agent:");
    println!("  Name: {}", config.user_agent.crawler_name);
    println!("  Version: {}", config.user_agent.crawler_version);
    println!("  Contact URL: {}", config.user_agent.contact_url);
    println!("  Contact Email: {}", config.user_agent.contact_email);

    println!("\nOutput:");
    println!("  Data directory: {}", config.output.data_dir);
    println!("  History limit: {}", config.output.history_limit);

    println!("\n✓ Configuration is valid");
    println!("✓ Would start crawling from '{}'", config.crawler.seed);
}

/// Handles the --stats mode: shows completion statistics from the store
fn handle_stats(config: &plotfetch::Config) -> Result<(), Box<dyn std::error::Error>> {
    use plotfetch::output::{load_statistics, print_statistics};
    use plotfetch::ArticleStore;
    use std::path::Path;

    println!("Data directory: {}\n", config.output.data_dir);

    let store = ArticleStore::open(
        Path::new(&config.output.data_dir),
        config.output.history_limit,
    )?;

    let stats = load_statistics(&store);
    print_statistics(&stats);

    Ok(())
}

/// Handles the --history mode: shows the link discovery history
fn handle_history(config: &plotfetch::Config) -> Result<(), Box<dyn std::error::Error>> {
    use plotfetch::output::print_history;
    use plotfetch::ArticleStore;
    use std::path::Path;

    let store = ArticleStore::open(
        Path::new(&config.output.data_dir),
        config.output.history_limit,
    )?;

    let history = store.load_link_history();
    print_history(&history);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: plotfetch::Config) -> Result<(), Box<dyn std::error::Error>> {
    use plotfetch::output::print_summary;

    tracing::info!(
        "Seed: '{}', budget: {} articles, data dir: {}",
        config.crawler.seed,
        config.crawler.max_items,
        config.output.data_dir
    );

    match crawl(config).await {
        Ok(summary) => {
            tracing::info!("Crawl completed successfully");
            print_summary(&summary);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
