//! Multi-document synchronization
//!
//! One base document is the structural authority; dependent documents keep
//! their own leaf values but must mirror the base's shape. [`StructuralDiff`]
//! classifies how the base's shape drifted between observation passes, and
//! [`SyncEngine`] replays that drift onto every watched dependent.

pub mod diff;
pub mod engine;

pub use diff::StructuralDiff;
pub use engine::{ApplyReport, EngineConfig, SyncEngine, SyncFailure, WatchStatus};
