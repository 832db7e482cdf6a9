//! Error types for the migration pipeline.
//!
//! The BBCode converter itself is total and never fails; everything around
//! it (file loading, CSV parsing, the GitHub API) reports through
//! [`MigrateError`].

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, MigrateError>;

/// All failure modes of the migration pipeline.
#[derive(Error, Debug)]
pub enum MigrateError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("malformed record: {0}")]
    Record(String),

    #[error("GitHub API error (status {status}): {message}")]
    Github { status: u16, message: String },

    #[error("validation error: {field}: {message}")]
    Validation { field: String, message: String },
}

impl MigrateError {
    /// Build a validation error for a named input.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Build a malformed-record error.
    pub fn record(message: impl Into<String>) -> Self {
        Self::Record(message.into())
    }
}
