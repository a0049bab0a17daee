//! Error types for report assembly

use thiserror::Error;

/// Errors raised while building or exporting a report
#[derive(Error, Debug)]
pub enum ReportError {
    /// Template failed to load or render
    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    /// Filesystem or process I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The PDF program could not be started
    #[error("PDF renderer '{command}' unavailable: {reason}")]
    RendererUnavailable {
        /// Configured program
        command: String,
        /// Spawn failure
        reason: String,
    },

    /// The PDF program ran and failed
    #[error("PDF renderer exited with {status}: {stderr}")]
    RendererFailed {
        /// Exit status description
        status: String,
        /// Captured standard error
        stderr: String,
    },

    /// A report was requested with nothing to report
    #[error("Nothing to report: {0}")]
    Empty(String),
}

/// Result alias for report operations
pub type Result<T> = std::result::Result<T, ReportError>;
