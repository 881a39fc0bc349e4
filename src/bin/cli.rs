//! Board Watcher CLI
//!
//! Local execution entry point.

use std::path::PathBuf;
use std::time::Duration;

use board_watcher::{
    error::Result,
    models::Config,
    pipeline::{self, Reconciler},
    services::{Extractor, build_fetcher, build_notifier},
    storage::{LocalStorage, StateStore},
};
use clap::{Parser, Subcommand};
use tokio::sync::watch;

/// Board Watcher - forum board post notifier
#[derive(Parser, Debug)]
#[command(
    name = "board-watcher",
    version,
    about = "Watches a forum board and forwards new posts to a webhook"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "board-watcher.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Poll the board forever (default)
    Run,

    /// Run a single cycle and exit
    Once,

    /// Validate configuration and selectors
    Validate,

    /// Show persisted state info
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load_or_default(&cli.config);
    log::info!("Loaded configuration from {}", cli.config.display());

    if let Err(e) = config.validate() {
        log::error!("Config validation failed: {}", e);
        return Err(e);
    }
    let extractor = Extractor::new(&config.selectors)?;
    let storage = LocalStorage::from_paths(&config.paths);

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => {
            let fetcher = build_fetcher(&config.fetcher)?;
            let notifier = build_notifier(&config.notifier)?;
            let mut reconciler = Reconciler::load(
                &config,
                &extractor,
                fetcher.as_ref(),
                notifier.as_ref(),
                &storage,
            )
            .await;

            let (tx, rx) = watch::channel(false);
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    log::info!("Ctrl-C received, stopping after the current step...");
                    let _ = tx.send(true);
                }
            });

            log::info!("Watching {}", config.board.url);
            pipeline::run_watcher(
                &mut reconciler,
                Duration::from_secs(config.poll.interval_secs),
                rx,
            )
            .await;
        }

        Command::Once => {
            let fetcher = build_fetcher(&config.fetcher)?;
            let notifier = build_notifier(&config.notifier)?;
            let mut reconciler = Reconciler::load(
                &config,
                &extractor,
                fetcher.as_ref(),
                notifier.as_ref(),
                &storage,
            )
            .await;

            pipeline::log_cycle(1, reconciler.run_cycle().await);
        }

        Command::Validate => {
            log::info!("✓ Config OK (board URL, notifier, paths and selectors)");
            log::info!(
                "Notifier: {}",
                if config.notifier.enabled() {
                    "webhook"
                } else {
                    "log only (no webhook_url)"
                }
            );
        }

        Command::Info => {
            log::info!("Board: {}", config.board.url);
            log::info!("Poll interval: {}s", config.poll.interval_secs);

            let seen = storage.load_seen().await;
            let threads = storage.load_threads().await;
            log::info!(
                "Seen posts: {} ({})",
                seen.len(),
                storage.seen_file().display()
            );
            log::info!(
                "Monitored threads: {} ({})",
                threads.len(),
                storage.threads_file().display()
            );
            for (url, title) in threads.iter() {
                log::info!("    {} - {}", title, url);
            }
        }
    }

    Ok(())
}
