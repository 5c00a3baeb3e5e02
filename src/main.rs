//! quiz-harvest main entry point
//!
//! This is the command-line interface for the quiz question harvester.

use clap::Parser;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use quiz_harvest::config::{load_config_with_hash, override_category, CategorySelection, Config};
use quiz_harvest::crawler::{harvest, Harvester, LocateOutcome};
use quiz_harvest::site::{PageBound, SiteUrls};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// quiz-harvest: an incremental quiz question harvester
///
/// quiz-harvest walks the category listings of a trivia site newest first,
/// stores every question it has not seen before in SQLite, and exports
/// stored categories as Anki import files.
#[derive(Parser, Debug)]
#[command(name = "quiz-harvest")]
#[command(version = "1.0.0")]
#[command(about = "An incremental quiz question harvester", long_about = None)]
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

    /// Validate config and show what would be crawled without any network access
    #[arg(long, conflicts_with_all = ["stats", "export", "locate"])]
    dry_run: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with_all = ["dry_run", "export", "locate"])]
    stats: bool,

    /// Write the Anki import file for one stored category and exit
    #[arg(long, value_name = "CATEGORY", conflicts_with_all = ["dry_run", "stats", "locate"])]
    export: Option<String>,

    /// Find the listing page that holds a question number and exit
    #[arg(long, value_name = "NUMBER", conflicts_with_all = ["dry_run", "stats", "export"])]
    locate: Option<i64>,

    /// Category to crawl or search instead of the configured one ("ALL" for every category)
    #[arg(long, value_name = "SLUG")]
    category: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load and validate configuration
    let (mut config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok(loaded) => loaded,
        Err(e) => {
            setup_logging(cli.verbose, cli.quiet, None)?;
            tracing::error!(
                "Failed to load configuration from {}: {}",
                cli.config.display(),
                e
            );
            return Err(e.into());
        }
    };

    // Setup logging based on verbosity, plus the debug log file
    setup_logging(cli.verbose, cli.quiet, Some(Path::new(&config.output.log_file)))?;
    tracing::info!(
        "Configuration loaded from {} (hash: {})",
        cli.config.display(),
        config_hash
    );

    if let Some(category) = &cli.category {
        override_category(&mut config, category)?;
    }

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config)?;
    } else if cli.stats {
        handle_stats(&config)?;
    } else if let Some(category) = &cli.export {
        handle_export(&config, category)?;
    } else if let Some(number) = cli.locate {
        handle_locate(config, config_hash, number).await?;
    } else {
        handle_crawl(config, config_hash).await?;
    }

    Ok(())
}

/// Sets up the console subscriber based on verbosity and the debug log file
fn setup_logging(
    verbose: u8,
    quiet: bool,
    log_file: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("quiz_harvest=info,warn"),
            1 => EnvFilter::new("quiz_harvest=debug,info"),
            2 => EnvFilter::new("quiz_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    let console = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_filter(filter);

    let file_layer = match log_file {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .with_file(true)
                    .with_line_number(true)
                    .with_filter(LevelFilter::DEBUG),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file_layer)
        .init();

    Ok(())
}

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== quiz-harvest Dry Run ===\n");

    let urls = SiteUrls::new(&config.site.base_url, config.crawler.questions_per_page)?;

    println!("Site:");
    println!("  Base URL: {}", urls.base());
    if config.site.has_credentials() {
        println!("  Login as: {}", config.site.username);
    } else {
        println!("  Login: anonymous");
    }
    println!(
        "  Abort on login failure: {}",
        config.site.abort_on_login_failure
    );

    println!("\nCrawler Configuration:");
    println!("  Category: {}", config.crawler.category);
    let to_page = match config.crawler.to_page {
        PageBound::All => "ALL (last page included)".to_string(),
        PageBound::Page(page) => format!("{} (exclusive)", page),
    };
    println!("  Pages: from {} to {}", config.crawler.from_page, to_page);
    println!(
        "  Questions per page: {}",
        config.crawler.questions_per_page
    );
    println!(
        "  Pause between questions: {}-{}s",
        config.crawler.min_sleep_time, config.crawler.sleep_time
    );
    println!("  Stop at first known question: {}", config.crawler.only_new);
    println!("  Locator gap retries: {}", config.crawler.gap_retries);

    if let CategorySelection::Single(slug) = &config.crawler.category {
        println!(
            "  First listing: {}",
            urls.listing(slug, config.crawler.from_page)?
        );
    }

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);
    println!("  Images: {}", config.output.image_dir);
    println!("  Anki export: {}", config.output.export_dir);
    println!("  Log file: {}", config.output.log_file);

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    use quiz_harvest::output::{load_statistics, print_statistics};
    use quiz_harvest::storage::SqliteStorage;

    println!("Database: {}\n", config.output.database_path);

    let storage = SqliteStorage::new(Path::new(&config.output.database_path))?;
    let stats = load_statistics(&storage)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the --export mode: writes today's Anki file for one category
fn handle_export(config: &Config, category: &str) -> Result<(), Box<dyn std::error::Error>> {
    use quiz_harvest::output::export_category;
    use quiz_harvest::storage::SqliteStorage;

    let storage = SqliteStorage::new(Path::new(&config.output.database_path))?;
    let summary = export_category(
        &storage,
        category,
        &config.output.image_dir,
        Path::new(&config.output.export_dir),
        chrono::Local::now().date_naive(),
    )?;

    println!(
        "✓ Exported {} questions to: {}",
        summary.rows_written,
        summary.path.display()
    );

    Ok(())
}

/// Handles the --locate mode: bisects the category listing for one question
async fn handle_locate(
    config: Config,
    config_hash: String,
    number: i64,
) -> Result<(), Box<dyn std::error::Error>> {
    let category = match &config.crawler.category {
        CategorySelection::Single(slug) => slug.clone(),
        CategorySelection::All => {
            tracing::error!("--locate needs a single category (use --category)");
            return Err("--locate needs a single category, not ALL".into());
        }
    };

    let harvester = Harvester::new(config, config_hash)?;
    match harvester.locate(&category, number).await? {
        LocateOutcome::Found { location, fetches } => {
            println!(
                "Question {} is on page {} (row {}) of '{}': {}",
                number, location.page, location.position, category, location.url
            );
            tracing::info!("Located after {} page fetches", fetches);
        }
        LocateOutcome::Absent { fetches } => {
            println!(
                "Question {} is not listed in '{}' ({} page fetches)",
                number, category, fetches
            );
        }
        LocateOutcome::Exhausted { fetches } => {
            println!(
                "Gave up looking for question {} in '{}' after {} page fetches",
                number, category, fetches
            );
        }
    }

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(
    config: Config,
    config_hash: String,
) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        "Starting harvest of {} (pages {} to {:?}, only new: {})",
        config.crawler.category,
        config.crawler.from_page,
        config.crawler.to_page,
        config.crawler.only_new
    );

    match harvest(config, config_hash).await {
        Ok(reports) => {
            let stored: u64 = reports.iter().map(|r| r.questions_stored).sum();
            let skipped: u64 = reports.iter().map(|r| r.questions_skipped).sum();
            for report in &reports {
                if let Some(stop) = report.stopped_at {
                    tracing::info!(
                        "'{}' stopped at known question {} (page {}, row {})",
                        report.category,
                        stop.number,
                        stop.page,
                        stop.row
                    );
                }
            }
            tracing::info!(
                "Harvest completed: {} categories, {} questions stored, {} skipped",
                reports.len(),
                stored,
                skipped
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            Err(e.into())
        }
    }
}
