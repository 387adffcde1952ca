use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tokio::sync::mpsc;

use newsdesk::app::{App, AppEvent};
use newsdesk::config::Config;
use newsdesk::session::Session;
use newsdesk::theme::ThemeVariant;

/// Get the config directory path (~/.config/newsdesk/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("newsdesk"))
}

#[derive(Parser, Debug)]
#[command(
    name = "newsdesk",
    about = "Terminal client for the news aggregator API"
)]
struct Args {
    /// API root URL, overriding `api_base_url` from the config file
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Config file to read instead of ~/.config/newsdesk/config.toml
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Color theme: dark or light
    #[arg(long)]
    theme: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; set RUST_LOG to see them
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config_path = match args.config {
        Some(path) => path,
        None => get_config_dir()?.join("config.toml"),
    };
    let mut config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    if let Some(base_url) = args.base_url {
        config.api_base_url = base_url;
    }
    if let Some(theme) = args.theme {
        if ThemeVariant::from_str_name(&theme).is_none() {
            anyhow::bail!("Unknown theme '{}': expected dark or light", theme);
        }
        config.theme = theme;
    }

    let session = match config.startup_token(std::env::var("NEWSDESK_TOKEN").ok()) {
        Some(token) => Session::with_token(token),
        None => Session::default(),
    };
    tracing::info!(
        base_url = %config.api_base_url,
        signed_in = session.is_authenticated(),
        "Starting newsdesk"
    );

    let mut app = App::new(&config, session).context("Failed to create application")?;

    // Create event channel for background tasks
    let (event_tx, event_rx) = mpsc::channel::<AppEvent>(100);

    newsdesk::ui::run(&mut app, event_tx, event_rx).await?;

    println!("Goodbye!");
    Ok(())
}
