//! Structural diff classification
//!
//! A [`StructuralDiff`] describes how the leaf-path shape of a document
//! drifted between two fingerprint snapshots. Additions and removals are
//! plain set differences; a removed path whose fingerprint reappears under
//! an added path is reclassified as a move, which lets the synchronization
//! engine relocate a dependent's own value instead of destroying it.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use lockstep_doc::Fingerprint;
use serde::{Deserialize, Serialize};

/// Classified structural drift between two snapshots.
///
/// Every path appears in at most one bucket: `added`, `removed`, or one
/// side of `moved`. The buckets conserve the raw set difference: for any
/// classification, `added.len() + removed.len() + 2 * moved.len()` equals
/// the size of the symmetric difference of the snapshots' path sets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuralDiff {
    /// Paths present only in the newer snapshot
    pub added: BTreeSet<String>,
    /// Paths present only in the older snapshot
    pub removed: BTreeSet<String>,
    /// Old path to new path, where the fingerprint survived relocation
    pub moved: BTreeMap<String, String>,
}

impl StructuralDiff {
    /// Classify the drift from `baseline` to `current`.
    ///
    /// Move pairing is deterministic: removed paths are visited in sorted
    /// order and each claims the first unclaimed added path carrying the
    /// same fingerprint. When several paths share a fingerprint the pairing
    /// is therefore well-defined but content-blind, an accepted limit of
    /// fingerprint matching.
    pub fn classify(
        baseline: &BTreeMap<String, Fingerprint>,
        current: &BTreeMap<String, Fingerprint>,
    ) -> Self {
        let mut added: BTreeSet<String> = current
            .keys()
            .filter(|path| !baseline.contains_key(*path))
            .cloned()
            .collect();
        let mut removed: BTreeSet<String> = baseline
            .keys()
            .filter(|path| !current.contains_key(*path))
            .cloned()
            .collect();

        // Unclaimed added paths per fingerprint, in sorted path order.
        let mut candidates: BTreeMap<&Fingerprint, VecDeque<&str>> = BTreeMap::new();
        for (path, fingerprint) in current {
            if !baseline.contains_key(path) {
                candidates.entry(fingerprint).or_default().push_back(path);
            }
        }

        let mut moved: BTreeMap<String, String> = BTreeMap::new();
        for path in &removed {
            if let Some(fingerprint) = baseline.get(path)
                && let Some(queue) = candidates.get_mut(fingerprint)
                && let Some(target) = queue.pop_front()
            {
                moved.insert(path.clone(), target.to_string());
            }
        }
        for (source, target) in &moved {
            removed.remove(source);
            added.remove(target);
        }

        Self {
            added,
            removed,
            moved,
        }
    }

    /// True when nothing drifted.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.moved.is_empty()
    }

    /// Number of classified structural edits.
    pub fn len(&self) -> usize {
        self.added.len() + self.removed.len() + self.moved.len()
    }

    /// Fold a newer diff into this one.
    ///
    /// Compositions collapse to their net effect: a path added and then
    /// moved is an addition at the new path; a move whose target is later
    /// removed is a removal of the source; a path removed and re-added
    /// cancels out; move chains `a -> b`, `b -> c` become `a -> c`, and
    /// `a -> b`, `b -> a` vanish. A move onto a path whose removal is still
    /// pending folds into a removal of the source: the target is treated as
    /// never having left, so a dependent keeps its own value there.
    ///
    /// Removals fold in before additions: a collapsed move can surface its
    /// origin as a removal, which a re-addition in the same newer diff must
    /// still be able to cancel.
    pub fn merge(&mut self, newer: StructuralDiff) {
        for (source, target) in newer.moved {
            if self.removed.remove(&target) {
                self.fold_removal(source);
            } else if self.added.remove(&source) {
                self.added.insert(target);
            } else if let Some(origin) = self.source_of(&source) {
                self.moved.remove(&origin);
                if origin != target {
                    self.moved.insert(origin, target);
                }
            } else {
                self.moved.insert(source, target);
            }
        }
        for path in newer.removed {
            self.fold_removal(path);
        }
        for path in newer.added {
            if !self.removed.remove(&path) {
                self.added.insert(path);
            }
        }
    }

    /// Fold one newer removal into the accumulated state.
    fn fold_removal(&mut self, path: String) {
        if self.added.remove(&path) {
            return;
        }
        if let Some(origin) = self.source_of(&path) {
            self.moved.remove(&origin);
            // The origin's path may still exist at the end when a later
            // pass re-created it, by move or by addition; only the value
            // stream died with the target.
            if !self.is_move_target(&origin) && !self.added.contains(&origin) {
                self.removed.insert(origin);
            }
        } else {
            self.removed.insert(path);
        }
    }

    /// The accumulated move source currently mapped to `target`, if any.
    fn source_of(&self, target: &str) -> Option<String> {
        self.moved
            .iter()
            .find(|(_, t)| t.as_str() == target)
            .map(|(source, _)| source.clone())
    }

    fn is_move_target(&self, path: &str) -> bool {
        self.moved.values().any(|target| target == path)
    }
}
