//! Error types for storage operations

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading or persisting files
#[derive(Error, Debug)]
pub enum StoreError {
    /// A required file does not exist
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Filesystem error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON (dataset or proposal log)
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed taxonomy TOML
    #[error("Invalid taxonomy TOML: {0}")]
    Toml(#[from] toml::de::Error),

    /// Well-formed but unusable data
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Result alias for storage operations
pub type Result<T> = std::result::Result<T, StoreError>;
