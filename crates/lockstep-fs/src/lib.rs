//! Filesystem document storage for Lockstep
//!
//! Provides the handle type, atomic file I/O, and the `DocumentStore`
//! collaborator the synchronization engine loads and persists dependent
//! documents through.

pub mod error;
pub mod handle;
pub mod io;
pub mod store;

pub use error::{Error, Result};
pub use handle::Handle;
pub use store::{DocumentStore, FsDocumentStore};
