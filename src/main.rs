//! # HwWatch — homework review status watcher
//!
//! Polls the review-status API and reports every distinct status change (or
//! failure) to a Telegram chat.
//!
//! Usage:
//!   hwwatch                          # Run forever, secrets from the environment
//!   hwwatch --config ./hwwatch.toml  # Explicit config file
//!   hwwatch --once --verbose         # Single cycle with debug logging

use anyhow::Result;
use clap::Parser;
use hwwatch_channels::{TelegramConfig, TelegramNotifier};
use hwwatch_core::WatcherConfig;
use hwwatch_watcher::{PracticumClient, Watcher};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

#[derive(Parser)]
#[command(
    name = "hwwatch",
    version,
    about = "Watches homework review status and reports changes to Telegram"
)]
struct Cli {
    /// Config file (default: ~/.hwwatch/config.toml if present)
    #[arg(short, long)]
    config: Option<String>,

    /// Seconds to sleep between polls (overrides the config file)
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
    interval: Option<u64>,

    /// Run a single cycle and exit
    #[arg(long)]
    once: bool,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,

    /// Also append logs to this file
    #[arg(long)]
    log_file: Option<String>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn expand_path(p: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(p).to_string())
}

fn init_logging(cli: &Cli) -> Result<()> {
    let filter = if cli.verbose {
        "hwwatch=debug,hwwatch_watcher=debug,hwwatch_channels=debug,hwwatch_core=debug"
    } else {
        "hwwatch=info,hwwatch_watcher=info,hwwatch_channels=info,hwwatch_core=info"
    };

    let stdout = if cli.log_json {
        fmt::layer().json().with_target(false).boxed()
    } else {
        fmt::layer().with_target(false).boxed()
    };

    let file = match &cli.log_file {
        Some(path) => {
            let path = expand_path(path);
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            let handle = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_line_number(true)
                    .with_writer(Mutex::new(handle)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with(stdout)
        .with(file)
        .init();
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    let config_path = cli.config.as_deref().map(expand_path);
    let mut config = match WatcherConfig::resolve(config_path.as_deref().map(Path::new)) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Watcher cannot start: {e}");
            return Err(e.into());
        }
    };
    if let Some(secs) = cli.interval {
        config.poll_interval_secs = secs;
    }
    tracing::debug!("Configuration: {config:?}");

    let notifier = Arc::new(TelegramNotifier::new(TelegramConfig {
        bot_token: config.telegram_token.clone(),
        api_base: config.telegram_api_base.clone(),
        timeout_secs: config.request_timeout_secs,
    }));
    match notifier.get_me().await {
        Ok(me) => tracing::info!(
            "🤖 Telegram bot: @{} ({})",
            me.username.as_deref().unwrap_or("unknown"),
            me.first_name
        ),
        Err(e) => tracing::warn!("⚠️ Could not verify Telegram bot: {e}"),
    }

    let source = Arc::new(PracticumClient::from_config(&config));
    tracing::info!("Polling {} every {}s", source.endpoint(), config.poll_interval_secs);

    let mut watcher = Watcher::from_config(&config, source, notifier)?;

    if cli.once {
        let outcome = watcher.run_cycle().await?;
        tracing::info!("Cycle finished: {outcome:?}");
        return Ok(());
    }

    watcher.run(shutdown_signal()).await?;
    Ok(())
}
