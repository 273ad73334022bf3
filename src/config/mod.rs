//! Configuration module
//!
//! Handles user settings: pacing, browser identity, rate limits and logging.

pub mod settings;

pub use settings::Settings;

use thiserror::Error;

/// Errors raised while loading or validating settings
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read settings: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid settings: {0}")]
    Invalid(String),
}
