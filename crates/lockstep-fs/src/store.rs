//! The document storage collaborator
//!
//! The synchronization engine reads and writes dependent documents through
//! the `DocumentStore` trait and stays agnostic to the concrete encoding.
//! `FsDocumentStore` is the filesystem implementation: handles resolve to
//! file paths, the extension picks the format (with content sniffing as the
//! read-side fallback), and writes go through the atomic writer.

use std::path::PathBuf;
use std::time::SystemTime;

use lockstep_doc::Format;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::handle::Handle;
use crate::io;

/// Reads and writes whole documents addressed by handle.
pub trait DocumentStore {
    /// Load the document at `handle`.
    fn read(&self, handle: &Handle) -> Result<Value>;

    /// Persist the document at `handle`.
    fn write(&self, handle: &Handle, document: &Value) -> Result<()>;

    /// Last-modified timestamp of the document at `handle`.
    ///
    /// Backs cache staleness checks.
    fn modified(&self, handle: &Handle) -> Result<SystemTime>;
}

/// Filesystem-backed document store.
#[derive(Debug, Default)]
pub struct FsDocumentStore {
    /// Relative handles resolve against this directory when set.
    root: Option<PathBuf>,
}

impl FsDocumentStore {
    /// Create a store that treats handles as filesystem paths directly.
    pub fn new() -> Self {
        Self { root: None }
    }

    /// Create a store that resolves relative handles against `root`.
    pub fn rooted(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    fn resolve(&self, handle: &Handle) -> PathBuf {
        match &self.root {
            Some(root) => root.join(handle.to_native()),
            None => handle.to_native(),
        }
    }

    fn format_for(&self, handle: &Handle, content: Option<&str>) -> Result<Format> {
        if let Some(ext) = handle.extension()
            && let Some(format) = Format::from_extension(ext)
        {
            return Ok(format);
        }
        match content {
            Some(content) => Ok(Format::from_content(content)),
            None => Err(Error::UnknownFormat {
                handle: handle.to_string(),
            }),
        }
    }
}

impl DocumentStore for FsDocumentStore {
    fn read(&self, handle: &Handle) -> Result<Value> {
        let path = self.resolve(handle);
        let content = io::read_text(&path)?;
        let format = self.format_for(handle, Some(&content))?;
        tracing::debug!("Read {} as {:?}", handle, format);
        format
            .parse(&content)
            .map_err(|e| Error::parse(path, e.to_string()))
    }

    fn write(&self, handle: &Handle, document: &Value) -> Result<()> {
        let path = self.resolve(handle);
        let format = self.format_for(handle, None)?;
        let rendered = format.render(document)?;
        io::write_atomic(&path, rendered.as_bytes())
    }

    fn modified(&self, handle: &Handle) -> Result<SystemTime> {
        let path = self.resolve(handle);
        let metadata = std::fs::metadata(&path).map_err(|e| Error::io(&path, e))?;
        metadata.modified().map_err(|e| Error::io(&path, e))
    }
}
