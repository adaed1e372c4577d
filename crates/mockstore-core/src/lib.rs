//! Reactive in-memory entity store for development and testing.
//!
//! This crate owns the domain model and the store that stands in for a
//! real backend while building and testing the front end:
//!
//! - **[`EntityStore`]**: Explicitly constructed, thread-safe registry of
//!   eight entity collections plus `incident` / `step` sequence counters.
//!   [`initialize()`](EntityStore::initialize) seeds it exactly once,
//!   [`reset()`](EntityStore::reset) returns it to the constructed state.
//!
//! - **[`EntityCollection<T>`]**: `DashMap` + `tokio::sync::watch` storage
//!   for one kind. Every write publishes a fresh `Arc` snapshot, so
//!   consumers detect change with `Arc::ptr_eq`.
//!
//! - **[`EntityStream<T>`]**: Subscription handle vended by the store.
//!   Exposes `current()` / `latest()` / `changed()` for reactive consumers;
//!   [`EntityStore::on_change`] serves synchronous ones.
//!
//! - **[`StoreOp`]**: Serializable store operations for scripted replay.
//!
//! - **Domain model** ([`model`]): `User`, `Role`, `Permission`,
//!   `EnhancedPermission`, `Location`, `Incident`, `Step`, `Dictionary`,
//!   all keyed by [`EntityId`].

pub mod config;
pub mod error;
pub mod model;
pub mod store;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{SequenceDefaults, StoreConfig};
pub use error::CoreError;
pub use store::{
    EntityCollection, EntityStore, InitOutcome, ListenerId, OpOutcome, Snapshot, StoreChange,
    StoreLifecycle, StoreOp,
};
pub use stream::{EntityFilter, EntityStream, IncidentFilter, StepFilter, UserFilter};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    // Access control
    EnhancedPermission,
    Permission,
    PermissionScope,
    Role,
    User,
    // Reference data
    Dictionary,
    DictionaryEntry,
    Location,
    // Incidents
    Incident,
    IncidentStatus,
    Severity,
    Step,
    StepStatus,
    // Identity and kinds
    Entity,
    EntityId,
    EntityKind,
    SequenceKind,
    // Seeding
    KindCounts,
    SeedData,
    SequenceSeed,
};
