// src/main.rs

//! noticast CLI.
//!
//! `run` is the long-lived daemon; the other commands are one-shot
//! helpers for operating and debugging a deployment.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::sync::watch;

use noticast::config::load_all;
use noticast::dispatch::Dispatcher;
use noticast::error::{AppError, Result};
use noticast::models::{Config, SourceFile};
use noticast::pipeline::{PollContext, run_cycle};
use noticast::scheduler;
use noticast::sources::AdapterRegistry;
use noticast::storage::{HistoryService, HistoryStore, LocalHistory};
use noticast::utils::date::now_in;
use noticast::utils::http;

/// noticast - notice board poller and notification dispatcher
#[derive(Parser, Debug)]
#[command(name = "noticast", version, about = "Polls notice boards and RSS feeds, dispatching new announcements")]
struct Cli {
    /// Path to the application config file
    #[arg(short, long, default_value = "data/config.toml")]
    config: PathBuf,

    /// Path to the source descriptor file
    #[arg(short, long, default_value = "data/sources.toml")]
    sources: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the polling daemon until interrupted
    Run,

    /// Run a single poll cycle now
    Poll {
        /// Poll only this source id
        #[arg(long)]
        source: Option<String>,

        /// Poll even outside the operating window
        #[arg(long)]
        ignore_window: bool,
    },

    /// Print the stored history window for a source
    History {
        /// Source id
        source_id: String,
    },

    /// Validate configuration and source descriptors
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Assemble the poll context shared by the daemon and one-shot polls.
fn build_context(config: Config, sources: SourceFile) -> Result<PollContext> {
    let config = Arc::new(config);
    let client = http::create_client(&config.http)?;

    let registry = AdapterRegistry::standard(Arc::clone(&config), client.clone());
    let store = Arc::new(LocalHistory::new(
        &config.history.dir,
        config.history.retention,
    ));
    let history = HistoryService::new(store, config.history.retention);
    let dispatcher = Dispatcher::from_config(&config, client)?;

    Ok(PollContext {
        config,
        sources: sources.sources,
        registry,
        history,
        dispatcher,
    })
}

async fn run_daemon(config: Config, sources: SourceFile) -> Result<()> {
    let shutdown_grace = Duration::from_secs(config.scheduler.shutdown_grace_secs);
    let ctx = Arc::new(build_context(config, sources)?);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = tokio::spawn(scheduler::run(ctx, shutdown_rx));

    tokio::signal::ctrl_c().await?;
    log::info!("Interrupt received; shutting down");
    let _ = shutdown_tx.send(true);

    if tokio::time::timeout(shutdown_grace, handle).await.is_err() {
        log::warn!(
            "In-flight cycle did not finish within {}s; abandoning it",
            shutdown_grace.as_secs()
        );
    }
    Ok(())
}

async fn run_poll_once(
    config: Config,
    mut sources: SourceFile,
    source_filter: Option<String>,
    ignore_window: bool,
) -> Result<()> {
    if let Some(id) = &source_filter {
        sources.sources.retain(|s| &s.id == id);
        if sources.sources.is_empty() {
            return Err(AppError::config(format!("Unknown source id '{id}'")));
        }
    }

    if !ignore_window {
        let now = now_in(&config.reference_offset());
        if !config.window.allows(now) {
            log::info!("Outside the operating window; pass --ignore-window to poll anyway");
            return Ok(());
        }
    }

    let ctx = build_context(config, sources)?;
    run_cycle(&ctx).await.log_summary();
    Ok(())
}

async fn show_history(config: Config, source_id: &str) -> Result<()> {
    let store = LocalHistory::new(&config.history.dir, config.history.retention);
    let entries = store.load(source_id).await?;

    if entries.is_empty() {
        println!("No history for source '{source_id}'");
        return Ok(());
    }

    println!("{} entry(ies) for source '{source_id}':", entries.len());
    for entry in entries {
        println!(
            "  {}  {}  {}",
            entry.published.format("%Y-%m-%d %H:%M"),
            entry.identity,
            entry.title
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let (config, sources) = load_all(&cli.config, &cli.sources)?;

    match cli.command {
        Command::Run => run_daemon(config, sources).await?,
        Command::Poll {
            source,
            ignore_window,
        } => run_poll_once(config, sources, source, ignore_window).await?,
        Command::History { source_id } => show_history(config, &source_id).await?,
        Command::Validate => {
            println!(
                "OK: {} source(s) ({} enabled), {} sink(s)",
                sources.sources.len(),
                sources.enabled_count(),
                config.sinks.len()
            );
        }
    }

    Ok(())
}
