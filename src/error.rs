//! Error types shared across the crate

use thiserror::Error;

/// Rejections raised while building a timer from user input.
///
/// These are caught before a command ever reaches the reducer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Timer name must not be empty")]
    EmptyName,

    #[error("Timer category must not be empty")]
    EmptyCategory,

    #[error("Duration must be a positive number of seconds")]
    NonPositiveDuration,
}

/// Failures surfaced by the state container handle.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The command loop has shut down and no longer accepts commands
    #[error("Timer store is closed")]
    Closed,
}

/// Failures raised by a blob store backend.
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("IO error on blob '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Blob store unavailable: {0}")]
    Unavailable(String),

    #[error("Corrupt payload in blob '{key}': {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize blob '{key}': {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}
