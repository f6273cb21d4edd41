//! Document model, path addressing, and content fingerprinting for Lockstep
//!
//! Provides the pure, stateless foundations the tracked store and the
//! synchronization engine are built on: separator-delimited path addressing
//! over nested documents, leaf-path enumeration, content fingerprinting, and
//! the text formats storage collaborators round-trip documents through.

pub mod error;
pub mod fingerprint;
pub mod format;
pub mod leaf;
pub mod path;

pub use error::{Error, Result};
pub use fingerprint::{DigestFn, Fingerprint, Fingerprinter, canonical_text, sha1_hex, sha256_hex};
pub use format::Format;
pub use leaf::{leaf_entries, leaf_entries_filtered, leaf_paths, matches_mask};
pub use path::{contains_path, get_path, prune_empty_upward, remove_path, set_path, split_path};
