//! In-memory document store used by unit tests.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use lockstep_fs::{DocumentStore, Handle};
use serde_json::Value;

/// A `DocumentStore` over a shared map, with a manually advanced clock so
/// staleness behavior is deterministic.
///
/// Clones share state, so a test can hand one clone to an engine and keep
/// another to inject external edits and failures.
#[derive(Clone, Default)]
pub(crate) struct MemoryStore {
    inner: Rc<Inner>,
}

#[derive(Default)]
struct Inner {
    documents: RefCell<BTreeMap<Handle, (Value, SystemTime)>>,
    clock: Cell<u64>,
}

impl MemoryStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn tick(&self) -> SystemTime {
        let next = self.inner.clock.get() + 1;
        self.inner.clock.set(next);
        UNIX_EPOCH + Duration::from_secs(next)
    }

    /// Seed or overwrite a document, advancing its timestamp.
    pub(crate) fn put(&self, handle: impl Into<Handle>, value: Value) {
        let stamp = self.tick();
        self.inner
            .documents
            .borrow_mut()
            .insert(handle.into(), (value, stamp));
    }

    /// Overwrite an existing document without touching its timestamp.
    pub(crate) fn put_silently(&self, handle: impl Into<Handle>, value: Value) {
        let handle = handle.into();
        if let Some((existing, _)) = self.inner.documents.borrow_mut().get_mut(&handle) {
            *existing = value;
        }
    }

    /// Drop a document so subsequent reads fail.
    pub(crate) fn remove(&self, handle: &Handle) {
        self.inner.documents.borrow_mut().remove(handle);
    }

    /// Read a document directly, bypassing any cache under test.
    pub(crate) fn get(&self, handle: &Handle) -> Option<Value> {
        self.inner
            .documents
            .borrow()
            .get(handle)
            .map(|(value, _)| value.clone())
    }
}

impl DocumentStore for MemoryStore {
    fn read(&self, handle: &Handle) -> lockstep_fs::Result<Value> {
        self.get(handle).ok_or_else(|| missing(handle))
    }

    fn write(&self, handle: &Handle, document: &Value) -> lockstep_fs::Result<()> {
        self.put(handle.clone(), document.clone());
        Ok(())
    }

    fn modified(&self, handle: &Handle) -> lockstep_fs::Result<SystemTime> {
        self.inner
            .documents
            .borrow()
            .get(handle)
            .map(|(_, stamp)| *stamp)
            .ok_or_else(|| missing(handle))
    }
}

fn missing(handle: &Handle) -> lockstep_fs::Error {
    lockstep_fs::Error::io(
        handle.to_native(),
        std::io::Error::new(std::io::ErrorKind::NotFound, "no such document"),
    )
}
