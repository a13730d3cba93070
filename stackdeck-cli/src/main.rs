// Suppress clippy warnings that require extensive refactoring
#![allow(clippy::collapsible_if)]

mod app;
mod backend;
mod clipboard;
mod error;
mod executor;
mod interactive;
mod pipeline;
mod process_tree;
mod ui;

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use stackdeck_core::config::DashboardConfig;

use backend::ToolBackend;
use ui::Theme;

/// Log filter directives, e.g. `STACKDECK_LOG=debug`.
const LOG_ENV: &str = "STACKDECK_LOG";

#[derive(Parser)]
#[command(name = "stackdeck")]
#[command(about = "Terminal dashboard for local development projects", long_about = None)]
struct Cli {
    /// Config file (default: <config dir>/stackdeck/config.yml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Orchestration executable, overriding the config file
    #[arg(short, long)]
    tool: Option<String>,
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("stackdeck").join("config.yml"))
}

fn default_log_path() -> Option<PathBuf> {
    dirs::cache_dir().map(|dir| dir.join("stackdeck").join("stackdeck.log"))
}

/// Send logs to a file; the terminal belongs to the dashboard.
///
/// When the file cannot be opened, logging is dropped.
fn init_logging(config: &DashboardConfig) {
    let Some(path) = config.log_file.clone().or_else(default_log_path) else {
        return;
    };
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info")))
        .with_ansi(false)
        .with_target(false)
        .with_writer(Mutex::new(file))
        .try_init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_path = default_config_path();
    let (config_path, mut config) =
        DashboardConfig::discover(cli.config.as_deref(), default_path.as_deref())
            .context("failed to load configuration")?;
    if let Some(tool) = cli.tool {
        config.tool = tool;
    }

    init_logging(&config);
    info!(
        config = ?config_path,
        tool = %config.tool,
        "starting stackdeck"
    );

    let no_color = std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty());
    let theme = Theme::resolve(config.simple_formatting, no_color);
    let backend = Arc::new(ToolBackend::from_config(&config));

    app::run(&config, backend, theme)
        .await
        .context("terminal error")?;
    Ok(())
}
