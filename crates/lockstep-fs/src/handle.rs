//! Document handles
//!
//! A handle is the stable identifier a storage collaborator resolves to a
//! concrete document, typically a file path. Handles normalize to forward
//! slashes internally so the same identifier is stable across platforms, and
//! they order lexicographically so handle sets iterate deterministically.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// A normalized document identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Handle {
    /// Internal representation always uses forward slashes
    inner: String,
}

impl Handle {
    /// Create a new Handle from any path-like input.
    ///
    /// Converts backslashes to forward slashes for internal storage.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path_str = path.as_ref().to_string_lossy();
        let normalized = path_str.replace('\\', "/");
        Self { inner: normalized }
    }

    /// Get the internal normalized string representation.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Convert to a platform-native PathBuf for I/O operations.
    pub fn to_native(&self) -> PathBuf {
        PathBuf::from(&self.inner)
    }

    /// Join this handle with a segment.
    pub fn join(&self, segment: &str) -> Self {
        let segment_normalized = segment.replace('\\', "/");
        let joined = if self.inner.ends_with('/') {
            format!("{}{}", self.inner, segment_normalized)
        } else {
            format!("{}/{}", self.inner, segment_normalized)
        };
        Self { inner: joined }
    }

    /// Get the file name component.
    pub fn file_name(&self) -> Option<&str> {
        let trimmed = self.inner.trim_end_matches('/');
        trimmed.rsplit('/').next()
    }

    /// Get the extension if present.
    ///
    /// The extension routes a handle to its document format.
    pub fn extension(&self) -> Option<&str> {
        self.file_name().and_then(|name| {
            let idx = name.rfind('.')?;
            if idx == 0 { None } else { Some(&name[idx + 1..]) }
        })
    }
}

impl AsRef<Path> for Handle {
    fn as_ref(&self) -> &Path {
        Path::new(&self.inner)
    }
}

impl std::fmt::Display for Handle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl From<&str> for Handle {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Handle {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<PathBuf> for Handle {
    fn from(p: PathBuf) -> Self {
        Self::new(p)
    }
}

impl From<&Path> for Handle {
    fn from(p: &Path) -> Self {
        Self::new(p)
    }
}
