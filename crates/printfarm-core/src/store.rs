// ── Reactive printer state store ──
//
// Lock-free concurrent storage with O(1) lookups and push-based
// change notification via `watch` channels. All mutation funnels
// through `update`, so readers only ever observe whole applied
// patches (last-known semantics, never torn writes).

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::watch;

use crate::error::{CoreError, CoreResult};
use crate::model::{PrinterId, PrinterPatch, PrinterState};

/// Reactive collection of live printer states.
///
/// Uses `DashMap` for concurrent per-printer access and `watch`
/// channels for push-based change notification. Every mutation bumps
/// a version counter and rebuilds the snapshot that subscribers
/// receive. States are handed out as `Arc` snapshots; a reader's view
/// is immutable and survives later patches unchanged.
pub struct PrinterStore {
    by_id: DashMap<PrinterId, Arc<PrinterState>>,

    /// Version counter, bumped on every mutation.
    version: watch::Sender<u64>,

    /// Full snapshot, rebuilt on mutation for efficient subscription.
    snapshot: watch::Sender<Arc<Vec<Arc<PrinterState>>>>,
}

impl PrinterStore {
    pub fn new() -> Self {
        let (version, _) = watch::channel(0u64);
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));

        Self {
            by_id: DashMap::new(),
            version,
            snapshot,
        }
    }

    /// Register a printer with its initial state.
    ///
    /// Fails if the id is already present; registration is the only
    /// way a printer enters the store, so duplicates indicate a caller
    /// bug rather than a race to tolerate.
    pub fn register(&self, state: PrinterState) -> CoreResult<Arc<PrinterState>> {
        let id = state.id;
        let arc = Arc::new(state);
        let inserted = match self.by_id.entry(id) {
            Entry::Occupied(_) => false,
            Entry::Vacant(v) => {
                v.insert(Arc::clone(&arc));
                true
            }
        };
        if !inserted {
            return Err(CoreError::PrinterAlreadyRegistered { id });
        }

        self.rebuild_snapshot();
        self.bump_version();
        Ok(arc)
    }

    /// Remove a printer. Returns its final state if it was present.
    pub fn deregister(&self, id: PrinterId) -> Option<Arc<PrinterState>> {
        let removed = self.by_id.remove(&id).map(|(_, v)| v);
        if removed.is_some() {
            self.rebuild_snapshot();
            self.bump_version();
        }
        removed
    }

    /// Current state of one printer (cheap `Arc` clone).
    pub fn get(&self, id: PrinterId) -> Option<Arc<PrinterState>> {
        self.by_id.get(&id).map(|r| Arc::clone(r.value()))
    }

    /// Username of whoever holds the printer's controller session.
    pub fn current_user(&self, id: PrinterId) -> CoreResult<Option<String>> {
        self.get(id)
            .map(|state| state.current_user.clone())
            .ok_or(CoreError::PrinterNotFound { id })
    }

    /// Base URL of the printer's controller.
    pub fn printer_url(&self, id: PrinterId) -> CoreResult<String> {
        self.get(id)
            .map(|state| state.printer_url.clone())
            .ok_or(CoreError::PrinterNotFound { id })
    }

    /// Apply a patch to one printer and return the updated state.
    ///
    /// The merge happens under the entry's shard lock, so concurrent
    /// patches to the same printer serialize and none is lost.
    pub fn update(&self, id: PrinterId, patch: PrinterPatch) -> CoreResult<Arc<PrinterState>> {
        let updated = {
            let mut entry = self
                .by_id
                .get_mut(&id)
                .ok_or(CoreError::PrinterNotFound { id })?;
            let mut state = (**entry).clone();
            patch.apply(&mut state);
            let arc = Arc::new(state);
            *entry = Arc::clone(&arc);
            arc
            // Entry guard drops here; snapshot rebuild below iterates
            // the map and must not run while a shard is held.
        };

        self.rebuild_snapshot();
        self.bump_version();
        Ok(updated)
    }

    /// Get the current snapshot of all printers (cheap `Arc` clone).
    pub fn snapshot(&self) -> Arc<Vec<Arc<PrinterState>>> {
        self.snapshot.borrow().clone()
    }

    /// Subscribe to snapshot changes via a `watch::Receiver`.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Vec<Arc<PrinterState>>>> {
        self.snapshot.subscribe()
    }

    /// Current mutation counter.
    pub fn version(&self) -> u64 {
        *self.version.borrow()
    }

    /// Subscribe to the mutation counter.
    pub fn subscribe_version(&self) -> watch::Receiver<u64> {
        self.version.subscribe()
    }

    pub fn contains(&self, id: PrinterId) -> bool {
        self.by_id.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// All currently registered printer ids.
    pub fn ids(&self) -> Vec<PrinterId> {
        self.by_id.iter().map(|r| *r.key()).collect()
    }

    // ── Private helpers ──────────────────────────────────────────────

    /// Collect all values into a snapshot vec and broadcast to subscribers.
    fn rebuild_snapshot(&self) {
        let values: Vec<Arc<PrinterState>> =
            self.by_id.iter().map(|r| Arc::clone(r.value())).collect();
        // `send_modify` updates unconditionally, even with zero receivers.
        self.snapshot.send_modify(|snap| *snap = Arc::new(values));
    }

    /// Increment the version counter.
    fn bump_version(&self) {
        self.version.send_modify(|v| *v += 1);
    }
}

impl Default for PrinterStore {
    fn default() -> Self {
        Self::new()
    }
}
