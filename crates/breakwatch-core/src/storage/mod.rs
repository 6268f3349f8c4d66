mod config;

pub use config::{BreakConfig, NotificationsConfig, Settings};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns `~/.config/breakwatch[-dev]/` based on BREAKWATCH_ENV.
///
/// Set BREAKWATCH_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("BREAKWATCH_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("breakwatch-dev")
    } else {
        base_dir.join("breakwatch")
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::DataDir {
        path: dir.clone(),
        message: e.to_string(),
    })?;
    Ok(dir)
}
