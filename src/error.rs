// src/error.rs

//! Unified error handling for the update feed.

use std::fmt;

use thiserror::Error;

/// Result type alias for feed operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Version text is not a dotted numeric version, or does not fit the encoding
    #[error("Invalid version '{0}'")]
    InvalidVersion(String),

    /// A release carries more assets than a single query page can hold
    #[error("Too many release assets for release {tag}: {count}")]
    TooManyReleaseAssets { tag: String, count: usize },

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream responded, but not with usable data
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// An update with the same version and branch already exists
    #[error("Duplicate update for version {version} on branch {branch}")]
    DuplicateKey { version: String, branch: String },

    /// Persistence layer rejected an operation
    #[error("Storage error: {0}")]
    Storage(String),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Create an invalid version error.
    pub fn invalid_version(text: impl Into<String>) -> Self {
        Self::InvalidVersion(text.into())
    }

    /// Create an upstream error.
    pub fn upstream(message: impl fmt::Display) -> Self {
        Self::Upstream(message.to_string())
    }

    /// Create a duplicate key error for a (version, branch) pair.
    pub fn duplicate(version: impl Into<String>, branch: impl fmt::Display) -> Self {
        Self::DuplicateKey {
            version: version.into(),
            branch: branch.to_string(),
        }
    }

    /// Create a storage error.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}
