//! Centralized error types for the habitdash application.
//!
//! Store crates keep their own typed errors; this module wraps them so the
//! bootstrap code and any presentation layer get one type with a
//! user-friendly message.

use habitdash_store::PersistenceError;
use habitdash_weather::WeatherError;
use thiserror::Error;

/// Top-level application error type.
///
/// Use `user_message()` to get a UI-appropriate message.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("Weather service error: {0}")]
    Weather(#[from] WeatherError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Returns a user-friendly message suitable for display in the UI.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Config(e) => e.user_message().to_string(),
            AppError::Persistence(e) => persistence_message(e).to_string(),
            AppError::Weather(e) => e.user_message(),
            AppError::Io(_) => "A file operation failed. Please try again.".to_string(),
            AppError::Other(_) => "An unexpected error occurred. Please try again.".to_string(),
        }
    }
}

fn persistence_message(error: &PersistenceError) -> &'static str {
    match error {
        PersistenceError::Io(_) | PersistenceError::Unavailable(_) => {
            "Unable to access local data. Check the data directory."
        }
        PersistenceError::Sqlite(_) => "The local database could not be opened.",
        PersistenceError::Serialization(_) => {
            "Local data may be corrupted. Consider resetting app data."
        }
        PersistenceError::VersionMismatch { .. } => {
            "Local data was written by a different version and was ignored."
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
        }
    }
}
