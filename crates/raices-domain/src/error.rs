//! Error types for domain operations

use thiserror::Error;

/// Errors raised by domain operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The Root Cards pool is too small to draw a full reading
    #[error("Root Cards pool has {available} cards, a reading needs {required}")]
    InsufficientPool {
        /// Cards available in the pool
        available: usize,
        /// Cards a reading requires
        required: usize,
    },

    /// A label that is not part of the graph
    #[error("Unknown card: {0}")]
    UnknownNode(String),
}
