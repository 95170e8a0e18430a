//! Error types for the memoizing cache
//!
//! Provides unified error handling using thiserror.

use std::path::PathBuf;

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Cache name is empty or contains non-alphanumeric characters
    #[error("Invalid cache name '{0}': only alphanumeric characters are allowed")]
    InvalidName(String),

    /// Target identity used for key derivation is empty
    #[error("Invalid target identity: must not be empty")]
    InvalidTarget,

    /// A call argument could not be rendered for key derivation
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A value could not be converted to or from JSON
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The backend could not be read or written
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The backend exists but does not hold a readable snapshot
    #[error("Corrupt snapshot at {path}: {source}")]
    CorruptSnapshot {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Internal error (poisoned lock and the like)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CacheError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CacheError::Io {
            path: path.into(),
            source,
        }
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
