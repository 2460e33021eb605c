//! Main application entry point
//!
//! Reads one JSON event per line on stdin and writes one JSON frame per line
//! on stdout. Logs go to stderr.

use std::path::PathBuf;

use anyhow::{Context, Result};
use hd_data::{DashboardConfig, Dataset};
use hd_views::Dashboard;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod session;

/// Environment variable naming the config file
const CONFIG_ENV: &str = "HD_CONFIG";

/// Directory searched when no config is given
const DEFAULT_DATA_DIR: &str = "data";

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// First argument, else `HD_CONFIG`
fn config_path() -> Option<PathBuf> {
    std::env::args_os()
        .nth(1)
        .or_else(|| std::env::var_os(CONFIG_ENV))
        .map(PathBuf::from)
}

fn load_config() -> Result<DashboardConfig> {
    match config_path() {
        Some(path) => DashboardConfig::load(&path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => {
            info!(dir = DEFAULT_DATA_DIR, "no config given, using data directory defaults");
            Ok(DashboardConfig::from_data_dir(DEFAULT_DATA_DIR))
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = load_config()?;
    info!(services = %config.services_path.display(), "starting hospital dashboard");

    let dataset = Dataset::load_async(config.clone())
        .await
        .context("failed to load dataset")?;
    // Predictor fits run while the dashboard is built; keep them off the runtime
    let dashboard = tokio::task::spawn_blocking(move || Dashboard::from_dataset(&dataset, &config))
        .await
        .context("failed to build dashboard")?;

    let lines = BufReader::new(tokio::io::stdin()).lines();
    let frames = session::run(dashboard, lines, tokio::io::stdout()).await?;
    info!(frames, "input closed, shutting down");
    Ok(())
}
