// src/main.rs

//! wgwatch: Kleinanzeigen WG Listing Watcher
//!
//! Polls a classifieds listing page, suppresses unwanted postings by
//! keyword, deduplicates against a persisted seen set and pushes new
//! postings to a Telegram chat.

use clap::Parser;

use wgwatch::error::Result;
use wgwatch::models::Config;
use wgwatch::pipeline::Watcher;
use wgwatch::utils::log;

#[derive(Parser, Debug)]
#[command(
    name = "wgwatch",
    version,
    about = "Watches a Kleinanzeigen listing page and pushes new WG postings to Telegram"
)]

/// CLI Arguments
struct Cli {
    #[arg(short, long, default_value = "data/config.toml")]
    config: String,

    #[arg(short, long)]
    quiet: bool,
}

/// Main entry point
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(&cli.config)?;
    config.validate()?;

    // Initialize logging system
    let level = if cli.quiet {
        "warn".to_string()
    } else {
        config.logging.level.clone()
    };
    log::init(&level, &config.paths.log_file)?;

    let mut watcher = Watcher::new(config).await?;
    watcher.run().await
}
