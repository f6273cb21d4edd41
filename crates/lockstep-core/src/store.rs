//! The tracked store
//!
//! A [`TrackedStore`] owns one nested document and fronts every mutation so
//! effective changes are detected, recorded in the append-only ledger, and
//! announced to registered observers. Change detection is fingerprint-based:
//! the store keeps a per-path fingerprint cache so rewriting a value with an
//! equal fingerprint is a no-op that records nothing.
//!
//! The cache starts empty even over a non-empty document; untracked values
//! enter tracking through the mutation that first touches them or through
//! [`TrackedStore::reconcile_all`]. Out-of-band edits made through
//! [`TrackedStore::document_mut`] or [`TrackedStore::replace_document`] are
//! invisible until [`TrackedStore::mark_changed`] or
//! [`TrackedStore::reconcile_all`] re-reads the affected paths.

use std::collections::BTreeMap;

use chrono::Utc;
use lockstep_doc::fingerprint::{DigestFn, Fingerprint, Fingerprinter, sha1_hex};
use lockstep_doc::leaf::leaf_entries;
use lockstep_doc::path::{contains_path, get_path, remove_path, set_path};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::ledger::{Ledger, LedgerEntry};

type Observer = Box<dyn FnMut(&LedgerEntry)>;

/// Options for a tracked store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Separator splitting paths into segments
    pub separator: String,
    /// Stamp ledger entries with the UTC time of the change
    pub stamp: bool,
    /// Digest for composite-value fingerprints
    pub digest: DigestFn,
    /// Ledger retention cap; `None` keeps the full history
    pub retention: Option<usize>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            separator: "/".to_string(),
            stamp: true,
            digest: sha1_hex,
            retention: None,
        }
    }
}

/// Outcome of a full-document reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileReport {
    /// Tracked paths whose value drifted from the cached fingerprint
    pub changed: Vec<String>,
    /// Tracked paths whose value no longer resolves; now untracked
    pub orphaned: Vec<String>,
    /// Paths discovered and brought under tracking
    pub newly_tracked: Vec<String>,
}

impl ReconcileReport {
    /// True when the pass found nothing to report.
    pub fn is_clean(&self) -> bool {
        self.changed.is_empty() && self.orphaned.is_empty() && self.newly_tracked.is_empty()
    }
}

/// A nested document with fingerprint-based change tracking.
pub struct TrackedStore {
    document: Value,
    separator: String,
    stamp: bool,
    fingerprinter: Fingerprinter,
    /// Last recorded fingerprint per tracked path
    fingerprints: BTreeMap<String, Fingerprint>,
    ledger: Ledger,
    observers: Vec<Observer>,
}

impl TrackedStore {
    /// Create a store over an empty mapping with default options.
    pub fn new() -> Self {
        Self::with_document(Value::Object(Map::new()))
    }

    /// Create a store over `document` with default options.
    pub fn with_document(document: Value) -> Self {
        Self::with_config(document, StoreConfig::default())
    }

    /// Create a store over `document` with explicit options.
    pub fn with_config(document: Value, config: StoreConfig) -> Self {
        Self {
            document,
            separator: config.separator,
            stamp: config.stamp,
            fingerprinter: Fingerprinter::with_digest(config.digest),
            fingerprints: BTreeMap::new(),
            ledger: Ledger::with_retention(config.retention),
            observers: Vec::new(),
        }
    }

    /// The configured path separator.
    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// Read the value at `path`.
    pub fn get(&self, path: &str) -> Result<Value> {
        get_path(&self.document, path, &self.separator)
            .cloned()
            .ok_or_else(|| Error::not_found(path))
    }

    /// True when `path` resolves to a value.
    pub fn contains(&self, path: &str) -> bool {
        contains_path(&self.document, path, &self.separator)
    }

    /// Write `value` at `path`, creating intermediate containers as needed.
    ///
    /// Returns `true` when the write changed anything. A value whose
    /// fingerprint equals the one already recorded for the path is a no-op:
    /// nothing is written, recorded, or announced.
    pub fn set(&mut self, path: &str, value: Value) -> Result<bool> {
        let new = self.fingerprinter.fingerprint(&value);
        let previous = match get_path(&self.document, path, &self.separator) {
            Some(existing) => Some(match self.fingerprints.get(path) {
                Some(cached) => cached.clone(),
                None => self.fingerprinter.fingerprint(existing),
            }),
            None => None,
        };
        if previous.as_ref() == Some(&new) {
            return Ok(false);
        }
        set_path(&mut self.document, path, &self.separator, value)?;
        self.fingerprints.insert(path.to_string(), new.clone());
        self.record(path, previous, Some(new));
        Ok(true)
    }

    /// Write `value` at `path` only if nothing is there yet.
    pub fn insert(&mut self, path: &str, value: Value) -> Result<()> {
        if self.contains(path) {
            return Err(Error::already_exists(path));
        }
        self.set(path, value)?;
        Ok(())
    }

    /// Remove the value at `path` and return it.
    ///
    /// Tracked paths underneath a removed container are untracked without
    /// individual ledger entries; the removal itself records one entry.
    pub fn delete(&mut self, path: &str) -> Result<Value> {
        let removed = remove_path(&mut self.document, path, &self.separator)
            .ok_or_else(|| Error::not_found(path))?;
        let previous = match self.fingerprints.remove(path) {
            Some(cached) => cached,
            None => self.fingerprinter.fingerprint(&removed),
        };
        self.untrack_under(path);
        self.record(path, Some(previous), None);
        Ok(removed)
    }

    /// Remove the value at `path`, or return `default` when nothing is there.
    ///
    /// The default case records no change.
    pub fn delete_or(&mut self, path: &str, default: Value) -> Value {
        match self.delete(path) {
            Ok(removed) => removed,
            Err(_) => default,
        }
    }

    /// Re-read the value at `path` and record a change if it drifted.
    ///
    /// This is how out-of-band edits enter the ledger. Returns `true` when a
    /// change was recorded. An untracked path whose value exists compares
    /// equal to itself: nothing is recorded and the path stays untracked.
    pub fn mark_changed(&mut self, path: &str) -> Result<bool> {
        let current = get_path(&self.document, path, &self.separator)
            .map(|value| self.fingerprinter.fingerprint(value))
            .ok_or_else(|| Error::not_found(path))?;
        let Some(previous) = self.fingerprints.get(path).cloned() else {
            return Ok(false);
        };
        if previous == current {
            return Ok(false);
        }
        self.fingerprints.insert(path.to_string(), current.clone());
        self.record(path, Some(previous), Some(current));
        Ok(true)
    }

    /// Sweep the whole document against the fingerprint cache.
    ///
    /// Every tracked path is re-read as by [`TrackedStore::mark_changed`];
    /// paths that no longer resolve are untracked and reported as orphaned
    /// without a ledger entry. With `track_new`, leaf paths not yet under
    /// tracking are fingerprinted and recorded as creations.
    pub fn reconcile_all(&mut self, track_new: bool) -> ReconcileReport {
        let mut report = ReconcileReport::default();
        let tracked: Vec<String> = self.fingerprints.keys().cloned().collect();
        for path in tracked {
            match self.mark_changed(&path) {
                Ok(true) => report.changed.push(path),
                Ok(false) => {}
                Err(_) => {
                    // The value disappeared out from under its cache entry.
                    self.fingerprints.remove(&path);
                    report.orphaned.push(path);
                }
            }
        }
        if track_new {
            let discovered: Vec<(String, Fingerprint)> =
                leaf_entries(&self.document, &self.separator)
                    .into_iter()
                    .filter(|(path, _)| !self.fingerprints.contains_key(path))
                    .map(|(path, value)| {
                        let fingerprint = self.fingerprinter.fingerprint(value);
                        (path, fingerprint)
                    })
                    .collect();
            for (path, fingerprint) in discovered {
                self.fingerprints.insert(path.clone(), fingerprint.clone());
                self.record(&path, None, Some(fingerprint));
                report.newly_tracked.push(path);
            }
        }
        report
    }

    /// The recorded change history.
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Discard the oldest ledger entries beyond the most recent `keep`.
    pub fn prune(&mut self, keep: usize) {
        self.ledger.prune(keep);
    }

    /// Register a callback invoked after every appended ledger entry.
    ///
    /// Observers fire in registration order, after the entry is in the
    /// ledger, only for effective changes.
    pub fn observe(&mut self, observer: impl FnMut(&LedgerEntry) + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// The underlying document.
    pub fn document(&self) -> &Value {
        &self.document
    }

    /// Mutable access to the underlying document, bypassing tracking.
    pub fn document_mut(&mut self) -> &mut Value {
        &mut self.document
    }

    /// Swap the whole document.
    ///
    /// The fingerprint cache and ledger are kept; a following
    /// [`TrackedStore::reconcile_all`] brings them in line.
    pub fn replace_document(&mut self, document: Value) -> Value {
        std::mem::replace(&mut self.document, document)
    }

    /// Paths currently under tracking, sorted.
    pub fn tracked_paths(&self) -> Vec<String> {
        self.fingerprints.keys().cloned().collect()
    }

    /// True when `path` has a cached fingerprint.
    pub fn is_tracked(&self, path: &str) -> bool {
        self.fingerprints.contains_key(path)
    }

    /// Fingerprint every leaf of the current document.
    ///
    /// This reads the document, not the cache: it is the snapshot primitive
    /// structural comparison is built on.
    pub fn leaf_fingerprints(&self) -> BTreeMap<String, Fingerprint> {
        leaf_entries(&self.document, &self.separator)
            .into_iter()
            .map(|(path, value)| (path, self.fingerprinter.fingerprint(value)))
            .collect()
    }

    fn untrack_under(&mut self, path: &str) {
        let prefix = format!("{path}{}", self.separator);
        self.fingerprints
            .retain(|tracked, _| !tracked.starts_with(&prefix));
    }

    fn record(&mut self, path: &str, previous: Option<Fingerprint>, new: Option<Fingerprint>) {
        let entry = LedgerEntry {
            path: path.to_string(),
            stamp: self.stamp.then(Utc::now),
            previous,
            new,
        };
        tracing::debug!("Recorded {:?} at {}", entry.kind(), entry.path);
        self.ledger.append(entry.clone());
        for observer in &mut self.observers {
            observer(&entry);
        }
    }
}

impl Default for TrackedStore {
    fn default() -> Self {
        Self::new()
    }
}
