//! Runtime configuration from the process environment.
//!
//! Five Podio credentials are required and checked before any network
//! activity. Cache and output locations have sensible defaults and can be
//! overridden for tests or ad-hoc runs.

use std::path::PathBuf;

use anyhow::{bail, Result};

/// Application name used for the default cache directory path
const APP_NAME: &str = "rosterstats";

/// Default CSV output file name
const CSV_FILE: &str = "membership_stats.csv";

/// Default plot output file name
const PLOT_FILE: &str = "membership_stats.png";

#[derive(Debug, Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub username: String,
    pub password: String,
    pub app_id: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub credentials: Credentials,
    pub cache_dir: PathBuf,
    pub csv_path: PathBuf,
    pub plot_path: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let credentials = Credentials {
            client_id: require("PODIO_CLIENT_ID")?,
            client_secret: require("PODIO_CLIENT_SECRET")?,
            username: require("PODIO_USERNAME")?,
            password: require("PODIO_PASSWORD")?,
            app_id: require("PODIO_APP_ID")?,
        };

        let cache_dir = match std::env::var("ROSTERSTATS_CACHE_DIR") {
            Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => dirs::cache_dir()
                .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?
                .join(APP_NAME),
        };

        let out_dir = match std::env::var("ROSTERSTATS_OUT_DIR") {
            Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => PathBuf::from("."),
        };

        Ok(Self {
            credentials,
            cache_dir,
            csv_path: out_dir.join(CSV_FILE),
            plot_path: out_dir.join(PLOT_FILE),
        })
    }
}

fn require(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => bail!("Missing required environment variable: {}", name),
    }
}
