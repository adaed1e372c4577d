// ── Generic reactive entity collection ──
//
// Concurrent storage with O(1) lookups and push-based change
// notification via `watch` channels.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::watch;

/// Shared, immutable view of a collection at one point in time.
pub type Snapshot<T> = Arc<Vec<Arc<T>>>;

/// A reactive collection for a single entity type.
///
/// Uses `DashMap` for O(1) lookups and `watch` channels for push-based
/// change notification. Every mutation bumps a version counter and
/// publishes a brand-new snapshot `Arc`, so consumers can tell whether
/// anything changed with `Arc::ptr_eq`. Operations that change nothing
/// publish nothing.
pub struct EntityCollection<T: Clone + Send + Sync + 'static> {
    /// Primary storage: entity id -> entity.
    by_key: DashMap<String, Arc<T>>,

    /// Version counter, bumped on every mutation.
    version: watch::Sender<u64>,

    /// Full snapshot, rebuilt on mutation for efficient subscription.
    snapshot: watch::Sender<Snapshot<T>>,
}

impl<T: Clone + Send + Sync + 'static> EntityCollection<T> {
    pub(crate) fn new() -> Self {
        let (version, _) = watch::channel(0u64);
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));

        Self {
            by_key: DashMap::new(),
            version,
            snapshot,
        }
    }

    /// Insert or replace an entity. Returns `true` if the key was new.
    pub(crate) fn upsert(&self, key: String, entity: T) -> bool {
        let is_new = self.by_key.insert(key, Arc::new(entity)).is_none();

        self.rebuild_snapshot();
        self.bump_version();

        is_new
    }

    /// Copy-on-write update of an existing entity.
    ///
    /// The closure runs on a private clone while the entry is locked, so
    /// concurrent updates of one key apply one after the other. The result
    /// replaces the stored `Arc`; holders of the previous value keep
    /// seeing it unchanged. Returns `None` without touching anything when
    /// the key is absent.
    ///
    /// The closure must not touch this collection.
    pub(crate) fn update_with(&self, key: &str, f: impl FnOnce(&mut T)) -> Option<Arc<T>> {
        let next = {
            let mut slot = self.by_key.get_mut(key)?;
            let mut next = T::clone(slot.value());
            f(&mut next);
            let next = Arc::new(next);
            *slot = Arc::clone(&next);
            next
        };

        self.rebuild_snapshot();
        self.bump_version();

        Some(next)
    }

    /// Remove an entity by key. Returns the removed entity if it existed.
    pub(crate) fn remove(&self, key: &str) -> Option<Arc<T>> {
        let removed = self.by_key.remove(key).map(|(_, v)| v);
        if removed.is_some() {
            self.rebuild_snapshot();
            self.bump_version();
        }
        removed
    }

    /// Replace the entire contents in one step, publishing a single snapshot.
    pub(crate) fn replace_all(&self, entries: impl IntoIterator<Item = (String, T)>) {
        self.by_key.clear();
        for (key, entity) in entries {
            self.by_key.insert(key, Arc::new(entity));
        }
        self.rebuild_snapshot();
        self.bump_version();
    }

    /// Remove all entities.
    pub(crate) fn clear(&self) {
        self.by_key.clear();
        self.rebuild_snapshot();
        self.bump_version();
    }

    /// Look up an entity by its id.
    pub fn get(&self, key: &str) -> Option<Arc<T>> {
        self.by_key.get(key).map(|r| Arc::clone(r.value()))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.by_key.contains_key(key)
    }

    /// Get the current snapshot (cheap `Arc` clone).
    pub fn snapshot(&self) -> Snapshot<T> {
        self.snapshot.borrow().clone()
    }

    /// Subscribe to snapshot changes via a `watch::Receiver`.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot<T>> {
        self.snapshot.subscribe()
    }

    /// Number of mutations applied since construction.
    pub fn version(&self) -> u64 {
        *self.version.borrow()
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    /// Return all current keys in the collection.
    pub fn keys(&self) -> Vec<String> {
        self.by_key.iter().map(|r| r.key().clone()).collect()
    }

    // ── Private helpers ──────────────────────────────────────────────

    /// Collect all values into a snapshot vec and broadcast to subscribers.
    ///
    /// Collection happens inside `send_modify`, so two rebuilds publish in
    /// the order they read the map.
    fn rebuild_snapshot(&self) {
        // `send_modify` updates unconditionally, even with zero receivers.
        self.snapshot.send_modify(|snap| {
            *snap = Arc::new(self.by_key.iter().map(|r| Arc::clone(r.value())).collect());
        });
    }

    /// Increment the version counter.
    fn bump_version(&self) {
        self.version.send_modify(|v| *v += 1);
    }
}
