//! Core error types for breakwatch-core.
//!
//! The error surface is small: the arbiter itself is infallible, so
//! errors only arise at the settings boundary - loading, saving, and
//! rejecting user-supplied values.

use std::path::PathBuf;
use thiserror::Error;

/// Settings-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to prepare the data directory
    #[error("Failed to prepare data directory {path}: {message}")]
    DataDir { path: PathBuf, message: String },

    /// Failed to load settings
    #[error("Failed to load settings from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save settings
    #[error("Failed to save settings to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Failed to serialize settings
    #[error("Failed to serialize settings: {0}")]
    ParseFailed(String),

    /// Key does not exist in the settings tree
    #[error("Unknown settings key: {0}")]
    UnknownKey(String),

    /// Value cannot be assigned to the key
    #[error("Invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Settings failed boundary validation
    #[error("Invalid settings: {0}")]
    Invalid(#[from] ValidationError),
}

/// Validation errors.
///
/// Raised at the boundary so invalid values never reach the arbiter.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}
