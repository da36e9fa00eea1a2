/// Entry point for the thermo-dashboard.
///
/// This function performs the following steps:
/// 1. Parses command-line overrides.
/// 2. Loads the layered configuration (defaults, TOML file, environment, CLI).
/// 3. Initializes logging for the selected run mode.
/// 4. Runs the subscriber and the dashboard until quit or a shutdown signal.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the configured logo
/// cannot be read, the terminal cannot be initialized, or the broker cannot
/// be reached on startup.
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

mod cli;
mod config;
mod error;
mod mqtt_handler;
mod reading;
mod service;
mod subscriber;
mod ui;

use cli::Cli;
use config::{AppConfig, LoggingConfig, DEFAULT_CONFIG_FILE};
use service::{DashboardService, RunMode};

fn init_logging(config: &LoggingConfig, mode: RunMode) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    // The TUI owns the terminal, so interactive logs go to a file or nowhere.
    let result = match (&config.file, mode) {
        (Some(path), _) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            if config.json {
                builder.json().with_writer(Mutex::new(file)).try_init()
            } else {
                builder
                    .with_ansi(false)
                    .with_writer(Mutex::new(file))
                    .try_init()
            }
        }
        (None, RunMode::Interactive) => builder.with_writer(std::io::sink).try_init(),
        (None, RunMode::Headless) => {
            if config.json {
                builder.json().with_writer(std::io::stderr).try_init()
            } else {
                builder
                    .with_ansi(config.colored)
                    .with_writer(std::io::stderr)
                    .try_init()
            }
        }
    };

    result.map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))
}

fn main() -> Result<()> {
    let cli = Cli::from_env_args();
    if cli.version {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let (config_path, required) = match &cli.config {
        Some(path) => (path.clone(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
    };
    let mut config = AppConfig::load(&config_path, required)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;
    config.apply_cli_overrides(&cli);
    config.validate()?;

    if cli.dump_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    let mode = if cli.headless || !atty::is(atty::Stream::Stdout) {
        RunMode::Headless
    } else {
        RunMode::Interactive
    };
    init_logging(&config.logging, mode)?;
    tracing::info!(
        "{} {} starting in {:?} mode",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        mode
    );

    DashboardService::new(config)?.run(mode)?;
    Ok(())
}
