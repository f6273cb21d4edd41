//! Append-only change ledger
//!
//! Every effective mutation of a tracked store appends one [`LedgerEntry`]
//! recording the path, an optional UTC stamp, and the fingerprint transition.
//! The pair of optional fingerprints encodes the change kind: a missing
//! previous fingerprint is a creation, a missing new fingerprint is a
//! removal, both present is an update. Consecutive entries for the same path
//! chain: the `new` fingerprint of one entry is the `previous` fingerprint of
//! the next.
//!
//! The ledger is in-memory and order-preserving. Read access hands out
//! borrows, so the history cannot be reordered or rewritten from outside;
//! the only mutations are appending and pruning from the oldest end.

use chrono::{DateTime, Utc};
use lockstep_doc::Fingerprint;
use serde::{Deserialize, Serialize};

/// The kind of change a ledger entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeKind {
    /// A value appeared at a previously unoccupied path
    Created,
    /// A value at an occupied path was replaced
    Updated,
    /// A value was removed from its path
    Removed,
}

/// One recorded change to a tracked document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Full separator-joined path of the changed value
    pub path: String,
    /// UTC time of the change; `None` when stamping is disabled
    pub stamp: Option<DateTime<Utc>>,
    /// Fingerprint before the change; `None` for creations
    pub previous: Option<Fingerprint>,
    /// Fingerprint after the change; `None` for removals
    pub new: Option<Fingerprint>,
}

impl LedgerEntry {
    /// Classify this entry from its fingerprint transition.
    pub fn kind(&self) -> ChangeKind {
        match (&self.previous, &self.new) {
            (Some(_), Some(_)) => ChangeKind::Updated,
            (Some(_), None) => ChangeKind::Removed,
            (None, _) => ChangeKind::Created,
        }
    }
}

/// Ordered history of recorded changes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ledger {
    entries: Vec<LedgerEntry>,
    /// Oldest entries are discarded past this cap; `None` keeps everything
    retention: Option<usize>,
}

impl Ledger {
    /// Create an unbounded ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a ledger that keeps at most `retention` entries.
    pub fn with_retention(retention: Option<usize>) -> Self {
        Self {
            entries: Vec::new(),
            retention,
        }
    }

    /// All recorded entries, oldest first.
    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    /// The most recent entry.
    pub fn last(&self) -> Option<&LedgerEntry> {
        self.entries.last()
    }

    /// Entries recorded for one path, oldest first.
    pub fn entries_for(&self, path: &str) -> Vec<&LedgerEntry> {
        self.entries.iter().filter(|e| e.path == path).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append an entry, discarding the oldest entries past the retention cap.
    pub fn append(&mut self, entry: LedgerEntry) {
        self.entries.push(entry);
        if let Some(cap) = self.retention
            && self.entries.len() > cap
        {
            let excess = self.entries.len() - cap;
            self.entries.drain(..excess);
        }
    }

    /// Discard the oldest entries beyond the most recent `keep`.
    ///
    /// `keep == 0` clears the whole history.
    pub fn prune(&mut self, keep: usize) {
        if keep == 0 {
            self.entries.clear();
        } else if self.entries.len() > keep {
            let excess = self.entries.len() - keep;
            self.entries.drain(..excess);
        }
    }
}
