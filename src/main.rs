//! Board Harvest main entry point
//!
//! This is the command-line interface for the Board Harvest post collector.

use board_harvest::config::{load_config_with_hash, Config};
use board_harvest::crawler::{run_harvest, select_mode, ScrapeMode};
use board_harvest::post::DATE_FORMAT;
use board_harvest::BoardKind;
use clap::Parser;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Board Harvest: collects posts from a discussion board into JSONL
///
/// Walks a board either by an inclusive post id range or backwards through a
/// date window, skipping posts already stored, and appends each post with its
/// comment thread to an append-only JSONL file.
#[derive(Parser, Debug)]
#[command(name = "board-harvest")]
#[command(version = "1.0.0")]
#[command(about = "Collects board posts into a JSONL store", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Board type (overrides the config file)
    #[arg(long, value_enum)]
    board_type: Option<BoardKind>,

    /// First post id to harvest (overrides the config file)
    #[arg(long)]
    start_id: Option<u64>,

    /// Last post id to harvest (overrides the config file)
    #[arg(long)]
    end_id: Option<u64>,

    /// First day of the date window, YYYY.MM.DD (overrides the config file)
    #[arg(long)]
    start_date: Option<String>,

    /// Last day of the date window, YYYY.MM.DD (overrides the config file)
    #[arg(long)]
    end_date: Option<String>,

    /// Skip comment threads
    #[arg(long)]
    no_comments: bool,

    /// Show the browser window
    #[arg(long)]
    headed: bool,

    /// Posts buffered before each flush
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    batch_size: Option<u64>,

    /// JSONL store path (overrides the config file)
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be harvested without harvesting
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics from the JSONL store and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

impl Cli {
    /// Command-line values win over the file; an id pair replaces a date
    /// pair from the file and vice versa.
    fn apply_overrides(&self, config: &mut Config) {
        let ids = self.start_id.is_some() || self.end_id.is_some();
        let dates = self.start_date.is_some() || self.end_date.is_some();

        if ids && !dates {
            config.range.start_date = None;
            config.range.end_date = None;
        }
        if dates && !ids {
            config.range.start_id = None;
            config.range.end_id = None;
        }
        if self.start_id.is_some() {
            config.range.start_id = self.start_id;
        }
        if self.end_id.is_some() {
            config.range.end_id = self.end_id;
        }
        if self.start_date.is_some() {
            config.range.start_date = self.start_date.clone();
        }
        if self.end_date.is_some() {
            config.range.end_date = self.end_date.clone();
        }

        if let Some(kind) = self.board_type {
            config.board.kind = kind;
        }
        if self.no_comments {
            config.crawler.crawl_comments = false;
        }
        if self.headed {
            config.crawler.headless = false;
        }
        if let Some(size) = self.batch_size {
            config.crawler.batch_size = size as usize;
        }
        if let Some(path) = &self.output {
            config.output.jsonl_path = path.clone();
        }
    }
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
    cli.apply_overrides(&mut config);

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config)?;
    } else if cli.stats {
        handle_stats(&config)?;
    } else {
        handle_harvest(config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("board_harvest=info,warn"),
            1 => EnvFilter::new("board_harvest=debug,info"),
            2 => EnvFilter::new("board_harvest=trace,debug"),
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

/// Handles the --dry-run mode: validates config and shows what would be harvested
fn handle_dry_run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let board = config.board.to_board()?;
    let mode = select_mode(&config.range.bounds()?)?;

    println!("=== Board Harvest Dry Run ===\n");

    println!("Board:");
    println!("  Id: {}", board.id);
    println!("  Type: {}", board.kind);
    println!("  Listing: {}", board.listing_url()?);

    println!("\nRange:");
    match mode {
        ScrapeMode::ById { start, end } => {
            println!("  Mode: by id");
            println!("  Posts: {} ..= {}", start, end);
        }
        ScrapeMode::ByDate(window) => {
            println!("  Mode: by date (walks back from the newest post)");
            println!(
                "  Window: {} ~ {}",
                window.start.format(DATE_FORMAT),
                window.end.format(DATE_FORMAT)
            );
        }
    }

    println!("\nCrawler Configuration:");
    println!("  Crawl comments: {}", config.crawler.crawl_comments);
    println!("  Comment wait: {}ms", config.crawler.comment_wait_ms);
    println!("  Request delay: {}ms", config.crawler.request_delay_ms);
    println!("  Headless: {}", config.crawler.headless);
    println!("  Batch size: {}", config.crawler.batch_size);
    println!(
        "  Page load timeout: {}s",
        config.crawler.page_load_timeout_secs
    );

    println!("\nOutput:");
    println!("  Store: {}", config.output.jsonl_path.display());

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles the --stats mode: shows statistics from the JSONL store
fn handle_stats(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    use board_harvest::output::{load_statistics, print_statistics};

    println!("Store: {}\n", config.output.jsonl_path.display());

    let stats = load_statistics(&config.output.jsonl_path)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the main harvest operation
async fn handle_harvest(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        "Board: {} ({}), store: {}",
        config.board.id,
        config.board.kind,
        config.output.jsonl_path.display()
    );

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, flushing pending posts");
            on_signal.cancel();
        }
    });

    match run_harvest(&config, cancel).await {
        Ok(summary) => {
            tracing::info!(
                "Harvest {}: {} visited, {} collected, {} duplicates, {} missing, {} failed, {} out of window, {} written",
                if summary.interrupted { "interrupted" } else { "completed" },
                summary.visited,
                summary.collected,
                summary.duplicates,
                summary.missing,
                summary.failures,
                summary.out_of_window,
                summary.flushed
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            Err(e.into())
        }
    }
}
