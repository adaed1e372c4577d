// ── Central reactive entity store ──
//
// Thread-safe storage for every entity kind plus the sequence counters
// and lifecycle state. Mutations are broadcast to subscribers via
// `watch` channels and to plain listeners via `on_change`.
//
// Writers take `writes` for the whole mutation and release it before
// listeners run; readers never take it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug, info, trace, warn};

use super::collection::{EntityCollection, Snapshot};
use super::listener::{ListenerId, Listeners, StoreChange};
use super::sequence::SequenceCounters;
use crate::config::StoreConfig;
use crate::error::CoreError;
use crate::model::{
    Dictionary, EnhancedPermission, Entity, EntityId, EntityKind, Incident, KindCounts, Location,
    Permission, Role, SeedData, SequenceKind, SequenceSeed, Step, User,
};
use crate::stream::{EntityFilter, EntityStream};

/// The two macro-states of a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreLifecycle {
    Uninitialized,
    Initialized,
}

/// Result of `EntityStore::initialize`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum InitOutcome {
    /// Seed data was applied; carries the number of entities per kind.
    Applied(KindCounts),
    /// The store was already initialized and nothing changed.
    Skipped,
}

impl InitOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }
}

/// Central reactive store for all mock domain entities.
///
/// Construct one per application (or per test) and share it by
/// reference or `Arc`. All operations are synchronous; a write is
/// visible to the very next read. Writes from several threads are
/// serialized, so none is lost or seen half-applied.
pub struct EntityStore {
    pub(crate) users: EntityCollection<User>,
    pub(crate) roles: EntityCollection<Role>,
    pub(crate) permissions: EntityCollection<Permission>,
    pub(crate) enhanced_permissions: EntityCollection<EnhancedPermission>,
    pub(crate) locations: EntityCollection<Location>,
    pub(crate) incidents: EntityCollection<Incident>,
    pub(crate) steps: EntityCollection<Step>,
    pub(crate) dictionaries: EntityCollection<Dictionary>,
    sequences: SequenceCounters,
    config: StoreConfig,
    initialized: AtomicBool,
    revision: watch::Sender<u64>,
    initialized_at: watch::Sender<Option<DateTime<Utc>>>,
    last_reset_at: watch::Sender<Option<DateTime<Utc>>>,
    listeners: Listeners,
    writes: Mutex<()>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    pub fn with_config(config: StoreConfig) -> Self {
        let (revision, _) = watch::channel(0u64);
        let (initialized_at, _) = watch::channel(None);
        let (last_reset_at, _) = watch::channel(None);

        Self {
            users: EntityCollection::new(),
            roles: EntityCollection::new(),
            permissions: EntityCollection::new(),
            enhanced_permissions: EntityCollection::new(),
            locations: EntityCollection::new(),
            incidents: EntityCollection::new(),
            steps: EntityCollection::new(),
            dictionaries: EntityCollection::new(),
            sequences: SequenceCounters::new(config.sequences),
            config,
            initialized: AtomicBool::new(false),
            revision,
            initialized_at,
            last_reset_at,
            listeners: Listeners::default(),
            writes: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Populate the store from seed data, once.
    ///
    /// Every collection is replaced wholesale: kinds missing from `seed`
    /// end up empty, and writes made before initialization are dropped.
    /// Calling this on an initialized store changes nothing and returns
    /// [`InitOutcome::Skipped`]. Seed data with blank or repeated ids is
    /// rejected before anything is touched.
    pub fn initialize(&self, seed: SeedData) -> Result<InitOutcome, CoreError> {
        let writes = self.write_lock();
        if self.is_initialized() {
            drop(writes);
            return Ok(self.skip_initialize());
        }

        seed.validate()?;

        let counts = seed.counts();
        let SeedData {
            users,
            roles,
            permissions,
            enhanced_permissions,
            locations,
            incidents,
            steps,
            dictionaries,
            sequences,
        } = seed;

        load(&self.users, users);
        load(&self.roles, roles);
        load(&self.permissions, permissions);
        load(&self.enhanced_permissions, enhanced_permissions);
        load(&self.locations, locations);
        load(&self.incidents, incidents);
        load(&self.steps, steps);
        load(&self.dictionaries, dictionaries);

        for kind in [SequenceKind::Incident, SequenceKind::Step] {
            let start = sequences
                .get(kind)
                .unwrap_or_else(|| self.config.sequences.get(kind));
            self.sequences.set(kind, start);
        }

        self.initialized.store(true, Ordering::Release);
        self.initialized_at.send_replace(Some(Utc::now()));
        self.bump_revision();
        drop(writes);

        info!(
            users = counts[&EntityKind::Users],
            roles = counts[&EntityKind::Roles],
            locations = counts[&EntityKind::Locations],
            incidents = counts[&EntityKind::Incidents],
            steps = counts[&EntityKind::Steps],
            next_incident = self.sequences.peek(SequenceKind::Incident),
            next_step = self.sequences.peek(SequenceKind::Step),
            "store initialized"
        );

        self.listeners.notify(&StoreChange::Initialized {
            counts: counts.clone(),
        });
        Ok(InitOutcome::Applied(counts))
    }

    fn skip_initialize(&self) -> InitOutcome {
        warn!("store already initialized, ignoring seed data");
        self.listeners.notify(&StoreChange::InitializeSkipped);
        InitOutcome::Skipped
    }

    /// Return to the freshly constructed state and record the reset time.
    pub fn reset(&self) {
        let writes = self.write_lock();
        self.users.clear();
        self.roles.clear();
        self.permissions.clear();
        self.enhanced_permissions.clear();
        self.locations.clear();
        self.incidents.clear();
        self.steps.clear();
        self.dictionaries.clear();
        self.sequences.restore(self.config.sequences);

        let was_initialized = self.initialized.swap(false, Ordering::AcqRel);
        self.initialized_at.send_replace(None);
        self.last_reset_at.send_replace(Some(Utc::now()));
        self.bump_revision();
        drop(writes);

        info!(was_initialized, "store reset");
        self.listeners.notify(&StoreChange::Reset);
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    pub fn state(&self) -> StoreLifecycle {
        if self.is_initialized() {
            StoreLifecycle::Initialized
        } else {
            StoreLifecycle::Uninitialized
        }
    }

    pub fn initialized_at(&self) -> Option<DateTime<Utc>> {
        *self.initialized_at.borrow()
    }

    pub fn last_reset_at(&self) -> Option<DateTime<Utc>> {
        *self.last_reset_at.borrow()
    }

    // ── Typed entity operations ──────────────────────────────────────

    /// Insert or overwrite the entity stored under `id` (last writer wins).
    ///
    /// The stored entity's own `id` field is set to `id`.
    pub fn set<E: Entity>(&self, id: impl Into<EntityId>, mut entity: E) {
        let id = id.into();
        entity.set_id(id.clone());
        let is_new = {
            let _writes = self.write_lock();
            let is_new = E::collection(self).upsert(id.as_str().to_owned(), entity);
            self.bump_revision();
            is_new
        };

        debug!(kind = %E::KIND, %id, is_new, "entity set");
        self.listeners
            .notify(&StoreChange::Upserted { kind: E::KIND, id });
    }

    /// Insert or overwrite an entity under its own id.
    pub fn insert<E: Entity>(&self, entity: E) {
        let id = entity.id().clone();
        self.set(id, entity);
    }

    /// Copy-on-write update of an existing entity.
    ///
    /// Never inserts: returns `None` and changes nothing when `id` is
    /// absent. The closure cannot change the entity's id. It runs while
    /// the store is locked for writing and must not call back into the
    /// store.
    pub fn update<E: Entity>(&self, id: &str, f: impl FnOnce(&mut E)) -> Option<Arc<E>> {
        let updated = {
            let _writes = self.write_lock();
            self.update_locked(id, f)
        };
        self.finish_update(id, updated)
    }

    /// Shallow, field-by-field merge of a JSON object onto an existing entity.
    ///
    /// Field names are the camelCase wire names. An `id` field in the
    /// patch is ignored. Returns `Ok(None)` when `id` is absent; a
    /// malformed patch is rejected without touching the store.
    pub fn merge<E: Entity>(&self, id: &str, patch: &Value) -> Result<Option<Arc<E>>, CoreError> {
        let invalid = |message: String| CoreError::InvalidPatch {
            kind: E::KIND,
            id: id.to_owned(),
            message,
        };

        let Value::Object(changes) = patch else {
            return Err(invalid("expected a JSON object".into()));
        };

        // Read, merge and write back under one lock so a concurrent write
        // to the same entity cannot slip in between.
        let writes = self.write_lock();
        let Some(current) = self.get::<E>(id) else {
            drop(writes);
            return Ok(self.finish_update::<E>(id, None));
        };

        let mut merged = serde_json::to_value(&*current)?;
        let Value::Object(fields) = &mut merged else {
            return Err(CoreError::Internal(format!(
                "{} did not serialize to an object",
                E::KIND.singular()
            )));
        };
        for (field, value) in changes {
            if field != "id" {
                fields.insert(field.clone(), value.clone());
            }
        }
        let next: E = serde_json::from_value(merged).map_err(|e| invalid(e.to_string()))?;

        let updated = self.update_locked::<E>(id, move |entity| *entity = next);
        drop(writes);
        Ok(self.finish_update(id, updated))
    }

    /// Remove an entity if present. No cascading into other collections.
    pub fn delete<E: Entity>(&self, id: &str) -> Option<Arc<E>> {
        let removed = {
            let _writes = self.write_lock();
            let removed = E::collection(self).remove(id);
            if removed.is_some() {
                self.bump_revision();
            }
            removed
        };
        let Some(removed) = removed else {
            trace!(kind = %E::KIND, id, "delete of missing entity ignored");
            return None;
        };

        debug!(kind = %E::KIND, id, "entity deleted");
        self.listeners.notify(&StoreChange::Removed {
            kind: E::KIND,
            id: EntityId::from(id),
        });
        Some(removed)
    }

    pub fn get<E: Entity>(&self, id: &str) -> Option<Arc<E>> {
        E::collection(self).get(id)
    }

    pub fn contains<E: Entity>(&self, id: &str) -> bool {
        E::collection(self).contains(id)
    }

    /// Snapshot of every entity of one kind, in no particular order.
    pub fn entities<E: Entity>(&self) -> Snapshot<E> {
        E::collection(self).snapshot()
    }

    pub fn count<E: Entity>(&self) -> usize {
        E::collection(self).len()
    }

    /// Entities of one kind matching a filter predicate.
    pub fn filter<E: Entity>(&self, filter: &impl EntityFilter<E>) -> Vec<Arc<E>> {
        self.entities::<E>()
            .iter()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect()
    }

    /// Direct access to a collection, for version checks and raw receivers.
    pub fn collection<E: Entity>(&self) -> &EntityCollection<E> {
        E::collection(self)
    }

    // ── Sequences ────────────────────────────────────────────────────

    /// Return the current value of a sequence and advance it by one.
    ///
    /// Fails with [`CoreError::SequenceExhausted`] once the counter reaches
    /// `u64::MAX`; the counter then stays put until a reset.
    pub fn next_sequence(&self, kind: SequenceKind) -> Result<u64, CoreError> {
        let value = {
            let _writes = self.write_lock();
            let value = self.sequences.next(kind);
            if value.is_some() {
                self.bump_revision();
            }
            value
        };
        let Some(value) = value else {
            warn!(sequence = %kind, "sequence exhausted");
            return Err(CoreError::SequenceExhausted { kind });
        };

        debug!(sequence = %kind, value, "sequence advanced");
        self.listeners
            .notify(&StoreChange::SequenceAdvanced { kind, value });
        Ok(value)
    }

    /// The value the next `next_sequence` call will return.
    pub fn peek_sequence(&self, kind: SequenceKind) -> u64 {
        self.sequences.peek(kind)
    }

    // ── Subscriptions ────────────────────────────────────────────────

    pub fn subscribe<E: Entity>(&self) -> EntityStream<E> {
        EntityStream::new(E::collection(self).subscribe())
    }

    /// Store-wide mutation counter; changes on every write of any kind.
    pub fn subscribe_revision(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    /// Register a callback invoked synchronously after every mutation.
    pub fn on_change(&self, listener: impl Fn(&StoreChange) + Send + Sync + 'static) -> ListenerId {
        self.listeners.add(Arc::new(listener))
    }

    /// Detach a listener. Returns `false` if it was already removed.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    // ── Export ───────────────────────────────────────────────────────

    /// Current contents as seed data, sorted by id, with the counters'
    /// next values as the starting sequences.
    pub fn export(&self) -> SeedData {
        SeedData {
            users: sorted(&self.users),
            roles: sorted(&self.roles),
            permissions: sorted(&self.permissions),
            enhanced_permissions: sorted(&self.enhanced_permissions),
            locations: sorted(&self.locations),
            incidents: sorted(&self.incidents),
            steps: sorted(&self.steps),
            dictionaries: sorted(&self.dictionaries),
            sequences: SequenceSeed {
                incident: Some(self.peek_sequence(SequenceKind::Incident)),
                step: Some(self.peek_sequence(SequenceKind::Step)),
            },
        }
    }

    pub fn counts(&self) -> KindCounts {
        KindCounts::from([
            (EntityKind::Users, self.users.len()),
            (EntityKind::Roles, self.roles.len()),
            (EntityKind::Permissions, self.permissions.len()),
            (EntityKind::EnhancedPermissions, self.enhanced_permissions.len()),
            (EntityKind::Locations, self.locations.len()),
            (EntityKind::Incidents, self.incidents.len()),
            (EntityKind::Steps, self.steps.len()),
            (EntityKind::Dictionaries, self.dictionaries.len()),
        ])
    }

    // ── Private helpers ──────────────────────────────────────────────

    /// A panic mid-write leaves nothing to repair: every collection write
    /// is a single map operation, so a poisoned lock is taken over as is.
    fn write_lock(&self) -> MutexGuard<'_, ()> {
        self.writes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Caller holds the write lock.
    fn update_locked<E: Entity>(&self, id: &str, f: impl FnOnce(&mut E)) -> Option<Arc<E>> {
        let key = EntityId::from(id);
        let updated = E::collection(self).update_with(id, move |entity| {
            f(entity);
            entity.set_id(key);
        })?;
        self.bump_revision();
        Some(updated)
    }

    /// Log and notify for an update, after the write lock is released.
    fn finish_update<E: Entity>(&self, id: &str, updated: Option<Arc<E>>) -> Option<Arc<E>> {
        let Some(updated) = updated else {
            trace!(kind = %E::KIND, id, "update of missing entity ignored");
            return None;
        };

        debug!(kind = %E::KIND, id, "entity updated");
        self.listeners.notify(&StoreChange::Updated {
            kind: E::KIND,
            id: EntityId::from(id),
        });
        Some(updated)
    }

    fn bump_revision(&self) {
        self.revision.send_modify(|r| *r += 1);
    }
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}

fn load<E: Entity>(collection: &EntityCollection<E>, items: Vec<E>) {
    collection.replace_all(
        items
            .into_iter()
            .map(|entity| (entity.id().as_str().to_owned(), entity)),
    );
}

fn sorted<E: Entity>(collection: &EntityCollection<E>) -> Vec<E> {
    let mut items: Vec<E> = collection.snapshot().iter().map(|e| E::clone(e)).collect();
    items.sort_by(|a, b| a.id().cmp(b.id()));
    items
}
