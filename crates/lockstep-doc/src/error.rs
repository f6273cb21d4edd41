//! Error types for lockstep-doc

/// Result type for lockstep-doc operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in lockstep-doc operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Failed to parse {format} content: {message}")]
    Parse { format: String, message: String },

    #[error("Cannot render {format} content: {reason}")]
    Render { format: String, reason: String },

    #[error("Invalid path {path}: {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn parse(format: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            format: format.into(),
            message: message.into(),
        }
    }

    pub fn render(format: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Render {
            format: format.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
