// ── Change listeners ──
//
// Plain observer interface for consumers that are not async: a callback
// registered with `EntityStore::on_change` receives every `StoreChange`
// synchronously, after the mutation has been published.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;

use crate::model::{EntityId, EntityKind, KindCounts, SequenceKind};

/// A mutation (or detectably skipped mutation) applied to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StoreChange {
    Initialized { counts: KindCounts },
    /// `initialize` was called on an already initialized store.
    InitializeSkipped,
    Reset,
    Upserted { kind: EntityKind, id: EntityId },
    Updated { kind: EntityKind, id: EntityId },
    Removed { kind: EntityKind, id: EntityId },
    SequenceAdvanced { kind: SequenceKind, value: u64 },
}

impl StoreChange {
    /// The entity kind touched, for single-entity changes.
    pub fn kind(&self) -> Option<EntityKind> {
        match self {
            Self::Upserted { kind, .. } | Self::Updated { kind, .. } | Self::Removed { kind, .. } => {
                Some(*kind)
            }
            _ => None,
        }
    }
}

/// Handle returned by `on_change`, used to detach the listener again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Arc<dyn Fn(&StoreChange) + Send + Sync>;

#[derive(Default)]
pub(crate) struct Listeners {
    next_id: AtomicU64,
    entries: DashMap<u64, Listener>,
}

impl Listeners {
    pub(crate) fn add(&self, listener: Listener) -> ListenerId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.entries.insert(id, listener);
        ListenerId(id)
    }

    pub(crate) fn remove(&self, id: ListenerId) -> bool {
        self.entries.remove(&id.0).is_some()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Invoke every listener in registration order.
    ///
    /// Callbacks are collected first so none runs while a map shard is
    /// locked; a listener may read the store or detach itself.
    pub(crate) fn notify(&self, change: &StoreChange) {
        if self.entries.is_empty() {
            return;
        }
        let mut current: Vec<(u64, Listener)> = self
            .entries
            .iter()
            .map(|r| (*r.key(), Arc::clone(r.value())))
            .collect();
        current.sort_unstable_by_key(|(id, _)| *id);
        for (_, listener) in current {
            listener(change);
        }
    }
}
