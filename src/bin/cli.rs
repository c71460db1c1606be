//! floorplan-watch CLI
//!
//! Local execution entry point. For AWS Lambda, use `floorplan-watch-lambda`.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use floorplan_watch::{
    error::Result,
    models::{Config, Snapshot},
    notify::format_message,
    pipeline::{self, RetryPolicy},
    services::{DocumentFetcher, FloorPlanParser, HttpFetcher},
};

/// floorplan-watch - Apartment availability watcher
#[derive(Parser, Debug)]
#[command(
    name = "floorplan-watch",
    version,
    about = "Watches a floor plan page and notifies when availability changes"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "floorplan-watch.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the watcher once under the retry policy
    Run,

    /// Fetch and parse the page without saving or notifying
    Check,

    /// Parse a saved HTML file
    Parse {
        /// Path to the HTML file
        file: PathBuf,
    },

    /// Show the stored snapshot
    Show,

    /// Validate configuration and selectors
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn print_snapshot(snapshot: &Snapshot) -> Result<()> {
    println!("{}", String::from_utf8_lossy(&snapshot.to_pretty_json()?));
    Ok(())
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let (mut config, load_error) = match Config::load(&cli.config) {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };
    config.apply_env_overrides();
    init_logging(cli.verbose || config.logging.debug);

    match load_error {
        Some(e) => log::warn!(
            "Failed to load config from {}: {}. Using defaults.",
            cli.config.display(),
            e
        ),
        None => log::info!("Loaded configuration from {}", cli.config.display()),
    }

    match cli.command {
        Command::Run => {
            config.validate()?;
            let watcher = pipeline::build_watcher(&config).await?;
            let policy = RetryPolicy::from_config(&config.retry);

            let outcome = watcher
                .run_with_retry(&policy, |success| {
                    if success {
                        log::info!("Availability check completed");
                    } else {
                        log::error!("Availability check failed after all retries");
                    }
                })
                .await;

            if !outcome.success {
                return Ok(ExitCode::FAILURE);
            }
        }

        Command::Check => {
            config.validate()?;
            let fetcher = HttpFetcher::from_config(&config.target)?;
            let parser = FloorPlanParser::new(&config.selectors)?;

            let document = fetcher.fetch(&config.target.url).await?;
            let snapshot = parser.parse(&document)?;
            log::info!(
                "Parsed {} floor plans with {} available units",
                snapshot.len(),
                snapshot.unit_count()
            );

            print_snapshot(&snapshot)?;
            println!();
            println!("{}", format_message(&snapshot));
        }

        Command::Parse { file } => {
            let parser = FloorPlanParser::new(&config.selectors)?;
            let document = std::fs::read_to_string(&file)?;
            let snapshot = parser.parse(&document)?;
            print_snapshot(&snapshot)?;
        }

        Command::Show => {
            let store = pipeline::build_store(&config).await?;
            log::info!("Snapshot location: {}", store.location());

            let snapshot = store.load().await;
            if snapshot.is_empty() {
                log::info!("No snapshot found yet.");
            } else {
                log::info!(
                    "{} floor plans, {} available units, fingerprint {}",
                    snapshot.len(),
                    snapshot.unit_count(),
                    snapshot.fingerprint()
                );
                println!("{}", format_message(&snapshot));
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            FloorPlanParser::new(&config.selectors)?;
            log::info!("✓ Config OK (target, storage, notifier, retry)");
            log::info!("✓ Selectors compile");
        }
    }

    Ok(ExitCode::SUCCESS)
}
