//! The synchronization engine
//!
//! The engine owns the base document in a [`TrackedStore`] and a set of
//! watched dependent handles. Editing goes through the engine so the base's
//! ledger stays authoritative; [`SyncEngine::monitor`] classifies structural
//! drift since the last pass, and [`SyncEngine::apply_changes`] replays the
//! accumulated drift onto every watched dependent, preserving each
//! dependent's own leaf values across moves.
//!
//! Per handle the lifecycle is one-way: untracked to watched or desynced on
//! admission, watched to desynced on structural mismatch or I/O failure. A
//! desynced handle is never re-admitted behind the caller's back; it takes
//! an explicit decision to bring a diverged document back in line.

use std::collections::{BTreeMap, BTreeSet};

use lockstep_doc::fingerprint::{DigestFn, Fingerprint, sha1_hex};
use lockstep_doc::leaf::{leaf_entries_filtered, matches_mask};
use lockstep_doc::path::{get_path, prune_empty_upward, remove_path, set_path};
use lockstep_fs::{DocumentStore, Handle};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cache::{CacheConfig, DocumentCache};
use crate::error::Result;
use crate::ledger::Ledger;
use crate::store::{ReconcileReport, StoreConfig, TrackedStore};

use super::diff::StructuralDiff;

/// Options for a synchronization engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Path separator shared by the base store and structural snapshots
    pub separator: String,
    /// Stamp the base ledger's entries with the UTC time of each change
    pub stamp: bool,
    /// Digest for composite-value fingerprints
    pub digest: DigestFn,
    /// Base ledger retention cap; `None` keeps the full history
    pub retention: Option<usize>,
    /// Dependent-document cache capacity
    pub cache_capacity: usize,
    /// Leaf paths matching any mask are invisible to synchronization
    pub ignore_masks: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            separator: "/".to_string(),
            stamp: true,
            digest: sha1_hex,
            retention: None,
            cache_capacity: CacheConfig::default().capacity,
            ignore_masks: Vec::new(),
        }
    }
}

impl EngineConfig {
    fn store_config(&self) -> StoreConfig {
        StoreConfig {
            separator: self.separator.clone(),
            stamp: self.stamp,
            digest: self.digest,
            retention: self.retention,
        }
    }
}

/// Admission outcome for a dependent handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WatchStatus {
    /// Structurally equal to the base; included in synchronization passes
    Watched,
    /// Structurally different or unreadable; excluded from passes
    Desynced,
    /// The handle is the base document itself
    Base,
}

/// One dependent that failed a synchronization pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncFailure {
    pub handle: Handle,
    pub reason: String,
}

/// Report from an [`SyncEngine::apply_changes`] pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApplyReport {
    /// Handles reconciled and persisted
    pub synced: Vec<Handle>,
    /// Handles that failed and were moved to the desynced set
    pub failed: Vec<SyncFailure>,
}

impl ApplyReport {
    /// True when no dependent failed.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Keeps dependent documents structurally aligned with one base document.
pub struct SyncEngine {
    store: Box<dyn DocumentStore>,
    base: TrackedStore,
    base_handle: Handle,
    watched: BTreeSet<Handle>,
    desynced: BTreeSet<Handle>,
    /// Leaf fingerprints of the base at the last monitor pass
    baseline: BTreeMap<String, Fingerprint>,
    /// Drift classified but not yet applied
    pending: StructuralDiff,
    cache: DocumentCache,
    separator: String,
    ignore_masks: Vec<String>,
}

impl SyncEngine {
    /// Create an engine over the document at `base_handle` with defaults.
    ///
    /// The base document must be readable; nothing else is touched.
    pub fn new(store: Box<dyn DocumentStore>, base_handle: impl Into<Handle>) -> Result<Self> {
        Self::with_config(store, base_handle, EngineConfig::default())
    }

    /// Create an engine with explicit options.
    pub fn with_config(
        store: Box<dyn DocumentStore>,
        base_handle: impl Into<Handle>,
        config: EngineConfig,
    ) -> Result<Self> {
        let base_handle = base_handle.into();
        let document = store.read(&base_handle)?;
        let base = TrackedStore::with_config(document, config.store_config());
        let mut engine = Self {
            store,
            base,
            base_handle,
            watched: BTreeSet::new(),
            desynced: BTreeSet::new(),
            baseline: BTreeMap::new(),
            pending: StructuralDiff::default(),
            cache: DocumentCache::new(CacheConfig {
                capacity: config.cache_capacity,
            }),
            separator: config.separator,
            ignore_masks: config.ignore_masks,
        };
        engine.baseline = engine.snapshot();
        Ok(engine)
    }

    /// Admit a dependent document for synchronization.
    ///
    /// The document is watched when its leaf-path set equals the base's and
    /// desynced otherwise; an unreadable document desyncs rather than
    /// errors. Re-adding a handle the engine already knows is a no-op that
    /// returns its current status.
    pub fn add_watch(&mut self, handle: impl Into<Handle>) -> WatchStatus {
        let handle = handle.into();
        if handle == self.base_handle {
            return WatchStatus::Base;
        }
        if self.watched.contains(&handle) {
            return WatchStatus::Watched;
        }
        if self.desynced.contains(&handle) {
            return WatchStatus::Desynced;
        }
        let document = match self.cache.fetch(self.store.as_ref(), &handle) {
            Ok(document) => document,
            Err(e) => {
                tracing::warn!("Could not read {}: {}", handle, e);
                self.desynced.insert(handle);
                return WatchStatus::Desynced;
            }
        };
        if self.masked_leaf_paths(&document) == self.masked_leaf_paths(self.base.document()) {
            tracing::debug!("Watching {}", handle);
            self.watched.insert(handle);
            WatchStatus::Watched
        } else {
            tracing::warn!("Structural mismatch for {}; marking desynced", handle);
            self.desynced.insert(handle);
            WatchStatus::Desynced
        }
    }

    /// Classify the base document's structural drift since the last pass.
    ///
    /// Replaces the snapshot, so a second call without intervening edits
    /// yields an empty diff. The classified drift also accumulates until
    /// [`SyncEngine::apply_changes`] drains it; the returned diff covers
    /// this pass alone.
    pub fn monitor(&mut self) -> StructuralDiff {
        let current = self.snapshot();
        let diff = StructuralDiff::classify(&self.baseline, &current);
        tracing::debug!(
            "Monitor pass: {} added, {} removed, {} moved",
            diff.added.len(),
            diff.removed.len(),
            diff.moved.len()
        );
        self.baseline = current;
        self.pending.merge(diff.clone());
        diff
    }

    /// Replay the accumulated drift onto every watched dependent.
    ///
    /// Moves relocate the dependent's own value; additions seed the base's
    /// value only where the dependent has none; removals delete the path
    /// and prune containers left empty. Each reconciled document is
    /// persisted through the storage collaborator. A failing dependent is
    /// moved to the desynced set and the pass continues with the rest.
    pub fn apply_changes(&mut self) -> ApplyReport {
        let diff = std::mem::take(&mut self.pending);
        let mut report = ApplyReport::default();
        if diff.is_empty() {
            return report;
        }
        let handles: Vec<Handle> = self.watched.iter().cloned().collect();
        for handle in handles {
            match self.apply_to(&handle, &diff) {
                Ok(()) => report.synced.push(handle),
                Err(e) => {
                    tracing::warn!("Desyncing {}: {}", handle, e);
                    self.watched.remove(&handle);
                    report.failed.push(SyncFailure {
                        handle: handle.clone(),
                        reason: e.to_string(),
                    });
                    self.desynced.insert(handle);
                }
            }
        }
        report
    }

    /// Persist the base document through the storage collaborator.
    pub fn save(&self) -> Result<()> {
        self.store.write(&self.base_handle, self.base.document())?;
        Ok(())
    }

    /// Read the value at `path` in the base document.
    pub fn get(&self, path: &str) -> Result<Value> {
        self.base.get(path)
    }

    /// Write `value` at `path` in the base document.
    pub fn set(&mut self, path: &str, value: Value) -> Result<bool> {
        self.base.set(path, value)
    }

    /// Write `value` at `path` in the base document, failing if occupied.
    pub fn insert(&mut self, path: &str, value: Value) -> Result<()> {
        self.base.insert(path, value)
    }

    /// Remove the value at `path` from the base document.
    pub fn delete(&mut self, path: &str) -> Result<Value> {
        self.base.delete(path)
    }

    /// True when `path` resolves in the base document.
    pub fn contains(&self, path: &str) -> bool {
        self.base.contains(path)
    }

    /// The base store's change history.
    pub fn ledger(&self) -> &Ledger {
        self.base.ledger()
    }

    /// Sweep the base document against its fingerprint cache.
    pub fn reconcile_all(&mut self, track_new: bool) -> ReconcileReport {
        self.base.reconcile_all(track_new)
    }

    /// The base document's tracked store.
    pub fn base(&self) -> &TrackedStore {
        &self.base
    }

    /// Mutable access to the base document's tracked store.
    pub fn base_mut(&mut self) -> &mut TrackedStore {
        &mut self.base
    }

    /// The handle the base document loads from and saves to.
    pub fn base_handle(&self) -> &Handle {
        &self.base_handle
    }

    /// Handles currently watched, in lexicographic order.
    pub fn watched(&self) -> &BTreeSet<Handle> {
        &self.watched
    }

    /// Handles excluded from synchronization.
    pub fn desynced(&self) -> &BTreeSet<Handle> {
        &self.desynced
    }

    /// Drift classified but not yet applied.
    pub fn pending(&self) -> &StructuralDiff {
        &self.pending
    }

    /// Hide every leaf path matching `mask` from snapshots and admission.
    ///
    /// Matching paths already in the baseline are dropped so the next pass
    /// does not classify them as removals.
    pub fn add_ignore_mask(&mut self, mask: impl Into<String>) {
        let mask = mask.into();
        self.baseline.retain(|path, _| !matches_mask(&mask, path));
        self.ignore_masks.push(mask);
    }

    /// Masked leaf fingerprints of the base document.
    fn snapshot(&self) -> BTreeMap<String, Fingerprint> {
        self.base
            .leaf_fingerprints()
            .into_iter()
            .filter(|(path, _)| !self.is_masked(path))
            .collect()
    }

    fn is_masked(&self, path: &str) -> bool {
        self.ignore_masks.iter().any(|mask| matches_mask(mask, path))
    }

    fn masked_leaf_paths(&self, document: &Value) -> BTreeSet<String> {
        leaf_entries_filtered(document, &self.separator, &self.ignore_masks)
            .into_iter()
            .map(|(path, _)| path)
            .collect()
    }

    fn apply_to(&mut self, handle: &Handle, diff: &StructuralDiff) -> Result<()> {
        let mut document = self.cache.fetch(self.store.as_ref(), handle)?;

        // Lift every moved source out first: an accumulated diff may move
        // one value onto a path another entry still has to vacate, so
        // placements must not run until all captures are done.
        let mut placements: Vec<(&String, Option<Value>)> = Vec::new();
        for (source, target) in &diff.moved {
            placements.push((target, remove_path(&mut document, source, &self.separator)));
        }
        for (target, carried) in placements {
            match carried {
                Some(own) => set_path(&mut document, target, &self.separator, own)?,
                // The dependent never had the source; treat the target as
                // an addition.
                None => self.seed(&mut document, target)?,
            }
        }
        for source in diff.moved.keys() {
            prune_empty_upward(&mut document, source, &self.separator);
        }
        for path in &diff.added {
            self.seed(&mut document, path)?;
        }
        for path in &diff.removed {
            if remove_path(&mut document, path, &self.separator).is_some() {
                prune_empty_upward(&mut document, path, &self.separator);
            }
        }

        self.store.write(handle, &document)?;
        let modified = self.store.modified(handle)?;
        self.cache.put(handle.clone(), document, modified);
        Ok(())
    }

    /// Seed the base's current value at `path` when the dependent has none.
    fn seed(&self, document: &mut Value, path: &str) -> Result<()> {
        if get_path(document, path, &self.separator).is_some() {
            return Ok(());
        }
        // A path deleted from the base again after classification has
        // nothing left to seed.
        if let Some(value) = get_path(self.base.document(), path, &self.separator) {
            set_path(document, path, &self.separator, value.clone())?;
        }
        Ok(())
    }
}
