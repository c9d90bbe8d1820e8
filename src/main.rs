//! rosterstats - monthly active-member statistics from a Podio roster.
//!
//! A single invocation fetches the member list and per-member revision
//! history (through a local JSON cache), determines when each member's
//! status changed to "ausgetreten", aggregates monthly active-member counts,
//! and writes a CSV plus a line chart. Exits non-zero on any unrecoverable
//! error.

mod api;
mod cache;
mod config;
mod detect;
mod models;
mod pipeline;
mod report;
mod stats;
mod utils;

use std::io;

use anyhow::Result;
use chrono::Utc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use api::PodioClient;
use cache::FileStore;
use config::Config;

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g. RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();

    // Configuration errors surface before any network activity
    let config = Config::from_env()?;
    let store = FileStore::new(config.cache_dir.clone())?;

    let client = PodioClient::authenticate(&config.credentials).await?;

    pipeline::run(
        &client,
        &store,
        Utc::now().date_naive(),
        &config.csv_path,
        &config.plot_path,
    )
    .await?;

    info!("Done");
    Ok(())
}
