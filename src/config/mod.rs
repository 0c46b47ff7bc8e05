//! Configuration module for SiteSearch-RS
//!
//! Handles loading settings from YAML files and environment variables.

mod settings;

pub use settings::*;

use anyhow::Result;
use once_cell::sync::OnceCell;
use std::path::PathBuf;
use tracing::info;

/// Global settings instance
static SETTINGS: OnceCell<Settings> = OnceCell::new();

/// Initialize global settings
pub fn init(settings: Settings) -> Result<&'static Settings> {
    SETTINGS
        .set(settings)
        .map_err(|_| anyhow::anyhow!("Settings already initialized"))?;
    get()
}

/// Get a reference to the global settings
pub fn get() -> Result<&'static Settings> {
    SETTINGS
        .get()
        .ok_or_else(|| anyhow::anyhow!("Settings not initialized"))
}

/// Load settings from the first file found, or defaults, then apply the environment
///
/// `SITESEARCH_SETTINGS_PATH` wins over the default locations.
pub fn load() -> Result<Settings> {
    let mut settings = match settings_path() {
        Some(path) => {
            info!("Loading settings from: {}", path.display());
            Settings::from_file(&path)?
        }
        None => {
            info!("No settings file found, using defaults");
            Settings::default()
        }
    };
    settings.merge_env();
    Ok(settings)
}

fn settings_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("SITESEARCH_SETTINGS_PATH") {
        let path = PathBuf::from(path);
        if path.exists() {
            return Some(path);
        }
    }

    let mut paths = vec![
        PathBuf::from("sitesearch.yml"),
        PathBuf::from("config/sitesearch.yml"),
    ];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("sitesearch-rs/sitesearch.yml"));
    }

    paths.into_iter().find(|p| p.exists())
}
