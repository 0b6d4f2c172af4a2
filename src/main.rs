#![forbid(unsafe_code)]

mod cli;
mod collection;
mod config;
mod console;
mod constants;
mod error;
mod hotkeys;
mod rotation;
mod settings;
mod traversal;
mod types;

use anyhow::{Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing::{debug, error, info, Level as TraceLevel};
use tracing_subscriber::FmtSubscriber;

use cli::{Cli, Mode, RunArgs};
use config::{resolve, RunConfig};
use console::print_block;
use hotkeys::{help_text, spawn_listener};
use rotation::Rotator;
use settings::locate_settings;
use traversal::Traversal;

fn run_rotation(config: &RunConfig, args: &RunArgs, settings_path: PathBuf) -> Result<()> {
    let random = config.random || args.random;
    let traversal = Traversal::new(config.collections(), random, StdRng::from_entropy())
        .context("Failed to load image collections")?;
    let mut rotator = Rotator::new(traversal, config.global_defaults(), args.overrides(), settings_path);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("Failed to build async runtime")?;

    let result = runtime.block_on(async {
        // Channel for key listener → rotation loop
        let (key_tx, mut key_rx) = mpsc::channel(constants::input::CHANNEL_CAPACITY);

        // Key listener is optional: without a terminal the timer still rotates
        let listener = match spawn_listener(key_tx.clone()) {
            Ok(handle) => {
                print_block(&help_text());
                Some(handle)
            }
            Err(e) => {
                error!(error = %e, "Failed to start key listener");
                hotkeys::print_terminal_warning();
                None
            }
        };

        let result = rotator.run(&mut key_rx).await;

        drop(key_rx);
        if let Some(handle) = listener {
            if let Err(e) = handle.await {
                error!(error = %e, "Key listener did not shut down cleanly");
            }
        }
        result
    });

    debug!(
        state = ?rotator.state(),
        cursor = ?rotator.traversal().cursor(),
        "Rotator finished"
    );
    result
}

fn check(config: &RunConfig, args: &RunArgs, settings_path: &Path) -> Result<()> {
    let mut report = format!("settings: {}\ncollections:", settings_path.display());
    for collection in config.collections() {
        let images = collection
            .load_images()
            .with_context(|| format!("Collection {} is not usable", collection.path.display()))?;
        report.push_str(&format!("\n  {:>5} images  {}", images.len(), collection.path.display()));
    }

    if let Some(first) = config.collections().first() {
        let overrides = args.overrides();
        let settings = resolve(&config.global_defaults(), Some(&first.overrides), Some(&overrides));
        report.push_str(&format!(
            "\nfirst collection: profile={} alignment={} stretch={} opacity={} interval={}m",
            settings.profile, settings.alignment, settings.stretch, settings.opacity, settings.interval_minutes
        ));
    }

    print_block(&report);
    Ok(())
}

fn main() -> Result<()> {
    // Parse log level from environment variable
    let log_level = match std::env::var("LOG_LEVEL")
        .unwrap_or_else(|_| "info".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => TraceLevel::TRACE,
        "debug" => TraceLevel::DEBUG,
        "warn" => TraceLevel::WARN,
        "error" => TraceLevel::ERROR,
        _ => TraceLevel::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(console::stdout_writer)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    let config_path = cli.opts.config.clone().unwrap_or_else(RunConfig::path);
    let config = RunConfig::load_from(&config_path)?;

    let explicit_settings = cli.opts.settings.as_deref().or(config.settings_path.as_deref());
    let settings_path = locate_settings(explicit_settings).context("Cannot find terminal settings")?;
    info!(path = %settings_path.display(), "Using terminal settings");

    match cli.cmd.unwrap_or(Mode::Run) {
        Mode::Run => run_rotation(&config, &cli.opts, settings_path),
        Mode::Check => check(&config, &cli.opts, &settings_path),
    }
}
