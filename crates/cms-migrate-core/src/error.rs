//! Error types for the CMS migration.
//!
//! Per-item failures (one page, one translation, one asset) are reported with
//! these types, logged and counted by the orchestrator. Only a missing page
//! list and a failed login abort a run.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the migration library.
#[derive(Debug, Error)]
pub enum MigrateError {
    // Input errors
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    // Remote API errors
    #[error("HTTP {status} from {url}: {body}")]
    Remote {
        status: u16,
        url: String,
        body: String,
    },

    #[error("Network error: {message}")]
    Transport {
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },
}

/// Result type alias for migration operations.
pub type Result<T> = std::result::Result<T, MigrateError>;

impl From<std::io::Error> for MigrateError {
    fn from(err: std::io::Error) -> Self {
        MigrateError::Io {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl From<serde_json::Error> for MigrateError {
    fn from(err: serde_json::Error) -> Self {
        MigrateError::Json {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<reqwest::Error> for MigrateError {
    fn from(err: reqwest::Error) -> Self {
        MigrateError::Transport {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl MigrateError {
    /// Create an IO error with path context.
    pub fn io_with_path(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        MigrateError::Io {
            message: err.to_string(),
            path: Some(path.into()),
            source: Some(err),
        }
    }

    /// HTTP status of a remote failure, if this is one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            MigrateError::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The remote side reported that the resource already exists.
    pub fn is_conflict(&self) -> bool {
        self.status_code() == Some(409)
    }
}
