use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

use stock_watcher::signals::wait_for_shutdown_signal;
use stock_watcher::{AppConfig, ChromeRenderer, PollOrchestrator, TelegramNotifier};

#[derive(Debug, Parser)]
#[command(name = "stock-watcher", version, about = "Watches a store page and pings Telegram when an item is in stock")]
struct Cli {
    /// Load environment variables from this file instead of ./.env
    #[arg(long, env = "STOCK_WATCHER_ENV_FILE")]
    env_file: Option<PathBuf>,

    /// Run a single check, print the verdict and exit
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.env_file {
        Some(path) => {
            dotenvy::from_path(path)
                .with_context(|| format!("Failed to load env file {}", path.display()))?;
        }
        None => {
            dotenvy::dotenv().ok();
        }
    }

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("stock_watcher=debug".parse()?)
                .add_directive("headless_chrome=warn".parse()?),
        )
        .init();

    info!("Starting Stock Watcher...");

    let config = AppConfig::from_env().context("Failed to load configuration")?;
    info!(
        chat_id = %config.telegram.chat_id,
        interval = %humantime::format_duration(config.scheduler.check_interval),
        "Configuration loaded"
    );

    let target = Arc::new(config.target.clone());
    let renderer = Arc::new(ChromeRenderer::new(config.scraper.clone()));
    let notifier = Arc::new(
        TelegramNotifier::new(&config.telegram).context("Failed to build Telegram client")?,
    );

    let orchestrator = PollOrchestrator::new(
        target,
        renderer,
        notifier,
        config.telegram.chat_id.clone(),
        config.scheduler.clone(),
        &config.scraper,
    )?;

    if cli.once {
        let verdict = orchestrator.run_once().await;
        println!("{}", serde_json::to_string_pretty(&verdict)?);
        return Ok(());
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        info!("Shutting down...");
        let _ = shutdown_tx.send(true);
    });

    orchestrator.run(shutdown_rx).await;

    Ok(())
}
