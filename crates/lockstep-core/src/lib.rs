//! Tracked store and synchronization engine for Lockstep
//!
//! This crate provides the stateful layer on top of the Layer 0 crates,
//! implementing:
//!
//! - **Tracked store**: a nested document whose mutations append to an
//!   ordered change ledger and notify observers, with fingerprint-based
//!   no-op suppression
//! - **Change ledger**: orderable creation/update/removal history with
//!   pruning and optional retention caps
//! - **Structural diff**: classification of leaf-path drift into additions,
//!   removals, and fingerprint-matched moves
//! - **SyncEngine**: keeps watched dependent documents structurally aligned
//!   with a base document while preserving their own leaf values
//!
//! # Architecture
//!
//! `lockstep-core` sits above the Layer 0 crates:
//!
//! ```text
//!        application
//!             |
//!       lockstep-core
//!        |         |
//!   lockstep-doc lockstep-fs
//! ```
//!
//! # Example
//!
//! ```
//! use lockstep_core::{Result, TrackedStore};
//! use serde_json::json;
//!
//! fn example() -> Result<()> {
//!     let mut store = TrackedStore::new();
//!     store.set("settings/theme", json!("dark"))?;
//!     store.set("settings/theme", json!("dark"))?; // no-op, not recorded
//!     assert_eq!(store.ledger().len(), 1);
//!     Ok(())
//! }
//! # example().unwrap();
//! ```

pub mod cache;
pub mod error;
pub mod ledger;
pub mod store;
pub mod sync;

#[cfg(test)]
mod testing;

pub use cache::{CacheConfig, DocumentCache};
pub use error::{Error, Result};
pub use ledger::{ChangeKind, Ledger, LedgerEntry};
pub use store::{ReconcileReport, StoreConfig, TrackedStore};
pub use sync::{ApplyReport, EngineConfig, StructuralDiff, SyncEngine, SyncFailure, WatchStatus};
