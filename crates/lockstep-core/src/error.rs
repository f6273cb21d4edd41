//! Error types for lockstep-core

/// Result type for lockstep-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in lockstep-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A path did not resolve to a value
    #[error("No value at path: {path}")]
    NotFound { path: String },

    /// An exclusive creation collided with an existing value
    #[error("Value already exists at path: {path}")]
    AlreadyExists { path: String },

    /// Document error from lockstep-doc
    #[error(transparent)]
    Doc(#[from] lockstep_doc::Error),

    /// Storage error from lockstep-fs
    #[error(transparent)]
    Fs(#[from] lockstep_fs::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }

    pub fn already_exists(path: impl Into<String>) -> Self {
        Self::AlreadyExists { path: path.into() }
    }
}
