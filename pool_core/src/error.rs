//! Error types for the pool_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for pool_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Measurement or registry input outside its valid domain
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// No pool registered under the given name
    #[error("Pool not found: {0}")]
    PoolNotFound(String),

    /// A pool with the given name is already registered
    #[error("Pool already exists: {0}")]
    DuplicatePool(String),

    /// Registry file is malformed
    #[error("Registry error: {0}")]
    Registry(String),
}
