//! Error types for tree building, hashing, diffing and reconciliation.

use std::path::PathBuf;
use thiserror::Error;

/// Filesystem and hashing errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Path not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Deadline exceeded while processing {}", .0.display())]
    DeadlineExceeded(PathBuf),
}

impl StorageError {
    /// Classify an I/O error raised while touching `path`.
    ///
    /// OS timeouts stay `Io`; only the hasher's own deadline becomes
    /// `DeadlineExceeded`.
    pub fn from_io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        let path = path.into();
        match err.kind() {
            std::io::ErrorKind::NotFound => StorageError::NotFound(path),
            std::io::ErrorKind::PermissionDenied => StorageError::PermissionDenied(path),
            _ => StorageError::Io { path, source: err },
        }
    }
}

/// Top-level errors surfaced to the CLI and to reconciliation drivers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Reconciliation failed: {0}")]
    ReconcileError(String),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
