//! Error types for lockstep-fs

use std::path::PathBuf;

/// Result type for lockstep-fs operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in lockstep-fs operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse document at {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Cannot determine format for {handle}")]
    UnknownFormat { handle: String },

    #[error("Lock acquisition failed for {path}")]
    LockFailed { path: PathBuf },

    #[error(transparent)]
    Doc(#[from] lockstep_doc::Error),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
        }
    }
}
