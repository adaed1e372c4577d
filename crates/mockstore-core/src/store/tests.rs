// ── EntityStore behaviour ──
//
// Lifecycle, CRUD contracts, sequences and change notification, checked
// through the public store API.

#![allow(clippy::unwrap_used)]

use std::sync::{Arc, Mutex};

use pretty_assertions::assert_eq;
use serde_json::json;

use super::*;
use crate::config::{SequenceDefaults, StoreConfig};
use crate::error::CoreError;
use crate::model::*;
use crate::stream::{IncidentFilter, UserFilter};

fn alice_seed() -> SeedData {
    SeedData {
        users: vec![User::new("u1", "Alice")],
        ..SeedData::default()
    }
}

fn rich_seed() -> SeedData {
    let mut ops = Incident::new("i1", 1000, "Water leak");
    ops.severity = Severity::High;
    ops.location_id = Some("loc-hq".into());
    ops.step_ids = vec!["s1".into()];

    let mut admin = User::new("u1", "Alice");
    admin.role_ids = vec!["r-admin".into()];
    let mut bob = User::new("u2", "Bob");
    bob.active = false;

    SeedData {
        users: vec![admin, bob],
        roles: vec![Role {
            id: "r-admin".into(),
            name: "Administrator".into(),
            description: None,
            permission_ids: vec!["p-read".into()],
        }],
        permissions: vec![Permission {
            id: "p-read".into(),
            name: "Read incidents".into(),
            resource: "incident".into(),
            action: "read".into(),
        }],
        locations: vec![Location {
            id: "loc-hq".into(),
            name: "Headquarters".into(),
            parent_id: None,
            address: None,
            code: Some("HQ".into()),
        }],
        incidents: vec![ops],
        steps: vec![Step::new("s1", 1, "i1", "Shut off mains")],
        dictionaries: vec![Dictionary {
            id: "d-cause".into(),
            name: "Causes".into(),
            entries: vec![DictionaryEntry {
                code: "PIPE".into(),
                label: "Burst pipe".into(),
                active: true,
            }],
        }],
        sequences: SequenceSeed {
            incident: Some(1001),
            step: None,
        },
        ..SeedData::default()
    }
}

fn record_changes(store: &EntityStore) -> Arc<Mutex<Vec<StoreChange>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    store.on_change(move |change| sink.lock().unwrap().push(change.clone()));
    seen
}

// ── Lifecycle ───────────────────────────────────────────────────────

#[test]
fn new_store_is_uninitialized_and_empty() {
    let store = EntityStore::new();
    assert_eq!(store.state(), StoreLifecycle::Uninitialized);
    assert!(store.counts().values().all(|n| *n == 0));
    assert_eq!(store.peek_sequence(SequenceKind::Incident), 1000);
    assert_eq!(store.peek_sequence(SequenceKind::Step), 1);
    assert!(store.initialized_at().is_none());
    assert!(store.last_reset_at().is_none());
}

#[test]
fn initialize_populates_supplied_kinds_only() {
    let store = EntityStore::new();
    let outcome = store.initialize(rich_seed()).unwrap();

    let InitOutcome::Applied(counts) = outcome else {
        panic!("expected seed to be applied");
    };
    assert_eq!(counts[&EntityKind::Users], 2);
    assert_eq!(counts[&EntityKind::EnhancedPermissions], 0);
    assert_eq!(store.count::<EnhancedPermission>(), 0);
    assert_eq!(store.count::<Dictionary>(), 1);
    assert_eq!(store.state(), StoreLifecycle::Initialized);
    assert!(store.initialized_at().is_some());
    assert_eq!(store.peek_sequence(SequenceKind::Incident), 1001);
    assert_eq!(store.peek_sequence(SequenceKind::Step), 1);
}

#[test]
fn initialize_twice_is_an_observable_no_op() {
    let store = EntityStore::new();
    let seen = record_changes(&store);
    assert!(store.initialize(alice_seed()).unwrap().is_applied());
    let after_first = store.export();
    let revision = store.revision();

    let second = store
        .initialize(SeedData {
            users: vec![User::new("u9", "Mallory")],
            ..SeedData::default()
        })
        .unwrap();

    assert_eq!(second, InitOutcome::Skipped);
    assert_eq!(store.export(), after_first);
    assert_eq!(store.revision(), revision);
    assert_eq!(seen.lock().unwrap().last(), Some(&StoreChange::InitializeSkipped));
}

#[test]
fn initialize_with_same_seed_twice_matches_once() {
    let once = EntityStore::new();
    let _ = once.initialize(rich_seed()).unwrap();

    let twice = EntityStore::new();
    let _ = twice.initialize(rich_seed()).unwrap();
    let _ = twice.initialize(rich_seed()).unwrap();

    assert_eq!(once.export(), twice.export());
}

#[test]
fn initialize_discards_writes_made_before_it() {
    let store = EntityStore::new();
    store.insert(User::new("early", "Early Bird"));
    let _ = store.initialize(alice_seed()).unwrap();

    assert!(store.get::<User>("early").is_none());
    assert_eq!(store.count::<User>(), 1);
}

#[test]
fn invalid_seed_leaves_store_untouched() {
    let store = EntityStore::new();
    let seed = SeedData {
        users: vec![User::new("u1", "Alice"), User::new("u1", "Alice again")],
        ..SeedData::default()
    };

    let err = store.initialize(seed).unwrap_err();

    assert!(matches!(
        err,
        CoreError::InvalidSeed {
            kind: EntityKind::Users,
            ..
        }
    ));
    assert!(!store.is_initialized());
    assert_eq!(store.count::<User>(), 0);
    assert!(store.initialize(alice_seed()).unwrap().is_applied());
}

#[test]
fn reset_restores_constructed_state() {
    let store = EntityStore::new();
    let pristine = store.export();
    let _ = store.initialize(rich_seed()).unwrap();
    store.insert(Role {
        id: "r2".into(),
        name: "Viewer".into(),
        description: None,
        permission_ids: vec![],
    });
    store.next_sequence(SequenceKind::Incident).unwrap();
    store.next_sequence(SequenceKind::Step).unwrap();

    store.reset();

    assert_eq!(store.export(), pristine);
    assert_eq!(store.state(), StoreLifecycle::Uninitialized);
    assert!(store.initialized_at().is_none());
    assert!(store.last_reset_at().is_some());
}

#[test]
fn reset_on_uninitialized_store_is_harmless() {
    let store = EntityStore::new();
    store.reset();
    assert!(!store.is_initialized());
    assert!(store.last_reset_at().is_some());
    assert!(store.initialize(alice_seed()).unwrap().is_applied());
}

#[test]
fn reset_uses_configured_sequence_defaults() {
    let store = EntityStore::with_config(StoreConfig {
        sequences: SequenceDefaults {
            incident: 5000,
            step: 100,
        },
    });
    let _ = store.initialize(SeedData::default()).unwrap();
    assert_eq!(store.next_sequence(SequenceKind::Incident).unwrap(), 5000);
    store.reset();
    assert_eq!(store.peek_sequence(SequenceKind::Incident), 5000);
    assert_eq!(store.peek_sequence(SequenceKind::Step), 100);
}

// ── CRUD contracts ──────────────────────────────────────────────────

#[test]
fn update_never_inserts() {
    let store = EntityStore::new();
    let _ = store.initialize(alice_seed()).unwrap();
    let before = store.entities::<User>();

    let result = store.update::<User>("ghost", |u| u.name = "Ghost".into());

    assert!(result.is_none());
    assert!(store.get::<User>("ghost").is_none());
    assert!(Arc::ptr_eq(&before, &store.entities::<User>()));
}

#[test]
fn merge_never_inserts() {
    let store = EntityStore::new();
    let updated = store
        .merge::<User>("ghost", &json!({"name": "Ghost"}))
        .unwrap();
    assert!(updated.is_none());
    assert_eq!(store.count::<User>(), 0);
}

#[test]
fn set_is_last_writer_wins() {
    let store = EntityStore::new();
    let mut a = User::new("x", "A");
    a.email = Some("a@example.com".into());
    let b = User::new("x", "B");

    store.set("x", a);
    store.set("x", b.clone());

    assert_eq!(*store.get::<User>("x").unwrap(), b);
    assert_eq!(store.count::<User>(), 1);
}

#[test]
fn set_normalizes_id_to_key() {
    let store = EntityStore::new();
    store.set("key", User::new("other", "Alice"));
    assert_eq!(store.get::<User>("key").unwrap().id.as_str(), "key");
    assert!(store.get::<User>("other").is_none());
}

#[test]
fn delete_is_idempotent() {
    let store = EntityStore::new();
    let _ = store.initialize(alice_seed()).unwrap();

    assert!(store.delete::<User>("u1").is_some());
    let snapshot = store.entities::<User>();
    assert!(store.delete::<User>("u1").is_none());
    assert!(store.delete::<User>("never").is_none());
    assert!(Arc::ptr_eq(&snapshot, &store.entities::<User>()));
}

#[test]
fn delete_does_not_cascade() {
    let store = EntityStore::new();
    let _ = store.initialize(rich_seed()).unwrap();

    store.delete::<Role>("r-admin");

    let alice = store.get::<User>("u1").unwrap();
    assert_eq!(alice.role_ids, vec![EntityId::from("r-admin")]);
    assert!(store.delete::<Incident>("i1").is_some());
    assert_eq!(store.count::<Step>(), 1);
}

#[test]
fn update_is_copy_on_write() {
    let store = EntityStore::new();
    let _ = store.initialize(alice_seed()).unwrap();
    let held = store.get::<User>("u1").unwrap();
    let snapshot = store.entities::<User>();

    let updated = store
        .update::<User>("u1", |u| u.email = Some("alice@example.com".into()))
        .unwrap();

    assert_eq!(held.email, None);
    assert_eq!(updated.email.as_deref(), Some("alice@example.com"));
    assert!(!Arc::ptr_eq(&snapshot, &store.entities::<User>()));
    assert_eq!(snapshot[0].email, None);
}

#[test]
fn update_cannot_change_id() {
    let store = EntityStore::new();
    let _ = store.initialize(alice_seed()).unwrap();
    let updated = store
        .update::<User>("u1", |u| u.id = "u2".into())
        .unwrap();
    assert_eq!(updated.id.as_str(), "u1");
    assert!(store.get::<User>("u2").is_none());
}

#[test]
fn merge_is_shallow_and_keeps_id() {
    let store = EntityStore::new();
    let _ = store.initialize(rich_seed()).unwrap();

    let updated = store
        .merge::<Incident>(
            "i1",
            &json!({"id": "hijack", "status": "inProgress", "stepIds": []}),
        )
        .unwrap()
        .unwrap();

    assert_eq!(updated.id.as_str(), "i1");
    assert_eq!(updated.status, IncidentStatus::InProgress);
    assert!(updated.step_ids.is_empty());
    assert_eq!(updated.title, "Water leak");
    assert_eq!(updated.severity, Severity::High);
}

#[test]
fn merge_rejects_bad_patches_without_mutation() {
    let store = EntityStore::new();
    let _ = store.initialize(rich_seed()).unwrap();
    let revision = store.revision();

    let not_object = store.merge::<Incident>("i1", &json!(["status"])).unwrap_err();
    let wrong_type = store
        .merge::<Incident>("i1", &json!({"number": "one thousand"}))
        .unwrap_err();

    assert!(matches!(not_object, CoreError::InvalidPatch { .. }));
    assert!(matches!(wrong_type, CoreError::InvalidPatch { .. }));
    assert_eq!(store.get::<Incident>("i1").unwrap().number, 1000);
    assert_eq!(store.revision(), revision);
}

#[test]
fn crud_works_before_initialize() {
    let store = EntityStore::new();
    store.insert(User::new("u1", "Alice"));
    assert_eq!(store.count::<User>(), 1);
    assert!(!store.is_initialized());
}

#[test]
fn filters_narrow_snapshots() {
    let store = EntityStore::new();
    let _ = store.initialize(rich_seed()).unwrap();

    assert_eq!(store.filter::<User>(&UserFilter::Active).len(), 1);
    assert_eq!(store.filter::<User>(&UserFilter::Inactive)[0].name, "Bob");
    assert_eq!(
        store
            .filter::<User>(&UserFilter::ByRole("r-admin".into()))
            .len(),
        1
    );
    assert_eq!(
        store
            .filter::<Incident>(&IncidentFilter::BySeverity(Severity::Critical))
            .len(),
        0
    );
    assert_eq!(store.filter::<Incident>(&IncidentFilter::Open).len(), 1);
    assert_eq!(store.filter::<User>(&|u: &User| u.name.starts_with('A')).len(), 1);
}

// ── Sequences ───────────────────────────────────────────────────────

#[test]
fn incident_sequence_is_strictly_increasing_from_default() {
    let store = EntityStore::new();
    let values: Vec<u64> = (0..50)
        .map(|_| store.next_sequence(SequenceKind::Incident).unwrap())
        .collect();

    assert_eq!(values[0], 1000);
    assert!(values.windows(2).all(|w| w[1] == w[0] + 1));
}

#[test]
fn sequences_do_not_reuse_numbers_after_delete() {
    let store = EntityStore::new();
    let n = store.next_sequence(SequenceKind::Incident).unwrap();
    store.insert(Incident::new("i", n, "first"));
    store.delete::<Incident>("i");
    assert_eq!(store.next_sequence(SequenceKind::Incident).unwrap(), n + 1);
}

#[test]
fn sequences_are_independent() {
    let store = EntityStore::new();
    assert_eq!(store.next_sequence(SequenceKind::Step).unwrap(), 1);
    assert_eq!(store.next_sequence(SequenceKind::Incident).unwrap(), 1000);
    assert_eq!(store.next_sequence(SequenceKind::Step).unwrap(), 2);
}

#[test]
fn exhausted_sequence_errors_instead_of_wrapping() {
    let store = EntityStore::new();
    let _ = store
        .initialize(SeedData {
            sequences: SequenceSeed {
                incident: Some(u64::MAX - 1),
                step: None,
            },
            ..SeedData::default()
        })
        .unwrap();

    assert_eq!(store.next_sequence(SequenceKind::Incident).unwrap(), u64::MAX - 1);
    let revision = store.revision();

    let err = store.next_sequence(SequenceKind::Incident).unwrap_err();
    assert!(matches!(
        err,
        CoreError::SequenceExhausted {
            kind: SequenceKind::Incident
        }
    ));
    assert_eq!(store.peek_sequence(SequenceKind::Incident), u64::MAX);
    assert_eq!(store.revision(), revision);
    assert_eq!(store.next_sequence(SequenceKind::Step).unwrap(), 1);

    store.reset();
    assert_eq!(store.next_sequence(SequenceKind::Incident).unwrap(), 1000);
}

// ── Concurrent writers ──────────────────────────────────────────────

#[test]
fn concurrent_updates_of_one_entity_are_all_kept() {
    let store = EntityStore::new();
    store.insert(Role {
        id: "r".into(),
        name: "Shared".into(),
        description: None,
        permission_ids: vec![],
    });

    std::thread::scope(|s| {
        for t in 0..8 {
            let store = &store;
            s.spawn(move || {
                for i in 0..200 {
                    store.update::<Role>("r", |r| r.permission_ids.push(format!("p-{t}-{i}").into()));
                }
            });
        }
    });

    let role = store.get::<Role>("r").unwrap();
    assert_eq!(role.permission_ids.len(), 1600);
    assert_eq!(store.entities::<Role>()[0].permission_ids.len(), 1600);
    assert_eq!(store.revision(), 1601);
}

#[test]
fn merges_do_not_clobber_concurrent_writes() {
    let store = EntityStore::new();
    store.insert(User::new("u1", "Alice"));

    std::thread::scope(|s| {
        let store = &store;
        s.spawn(move || {
            for i in 0..200 {
                store.merge::<User>("u1", &json!({"name": format!("name-{i}")})).unwrap();
            }
        });
        s.spawn(move || {
            for i in 0..200 {
                store.merge::<User>("u1", &json!({"email": format!("e{i}@example.com")})).unwrap();
            }
        });
        s.spawn(move || {
            for i in 0..200 {
                store.update::<User>("u1", |u| u.role_ids.push(format!("r-{i}").into()));
            }
        });
    });

    let user = store.get::<User>("u1").unwrap();
    assert_eq!(user.name, "name-199");
    assert_eq!(user.email.as_deref(), Some("e199@example.com"));
    assert_eq!(user.role_ids.len(), 200);
}

#[test]
fn racing_initialize_and_reset_leave_a_consistent_state() {
    for _ in 0..50 {
        let store = EntityStore::new();
        std::thread::scope(|s| {
            let store = &store;
            s.spawn(move || {
                for _ in 0..20 {
                    let _ = store.initialize(alice_seed()).unwrap();
                }
            });
            s.spawn(move || {
                for _ in 0..20 {
                    store.reset();
                }
            });
        });

        assert_eq!(store.is_initialized(), store.count::<User>() == 1);
        assert_eq!(store.is_initialized(), store.initialized_at().is_some());
    }
}

#[test]
fn listeners_may_write_back_into_the_store() {
    let store = Arc::new(EntityStore::new());
    let inner = Arc::clone(&store);
    store.on_change(move |change| {
        if let StoreChange::Upserted { kind: EntityKind::Users, id } = change {
            inner.update::<User>(id.as_str(), |u| u.active = false);
        }
    });

    store.insert(User::new("u1", "Alice"));

    assert!(!store.get::<User>("u1").unwrap().active);
}

// ── Notification ────────────────────────────────────────────────────

#[test]
fn listeners_see_changes_in_order() {
    let store = EntityStore::new();
    let seen = record_changes(&store);

    let _ = store.initialize(alice_seed()).unwrap();
    store.update::<User>("u1", |u| u.name = "Alicia".into());
    store.update::<User>("u404", |u| u.name = "nobody".into());
    store.next_sequence(SequenceKind::Step).unwrap();
    store.delete::<User>("u1");
    store.reset();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 5);
    assert!(matches!(seen[0], StoreChange::Initialized { .. }));
    assert_eq!(
        seen[1],
        StoreChange::Updated {
            kind: EntityKind::Users,
            id: "u1".into()
        }
    );
    assert_eq!(
        seen[2],
        StoreChange::SequenceAdvanced {
            kind: SequenceKind::Step,
            value: 1
        }
    );
    assert_eq!(
        seen[3],
        StoreChange::Removed {
            kind: EntityKind::Users,
            id: "u1".into()
        }
    );
    assert_eq!(seen[4], StoreChange::Reset);
}

#[test]
fn listener_can_read_store_during_callback() {
    let store = Arc::new(EntityStore::new());
    let observed = Arc::new(Mutex::new(None));

    let reader = Arc::downgrade(&store);
    let sink = Arc::clone(&observed);
    store.on_change(move |change| {
        if let (StoreChange::Upserted { id, .. }, Some(store)) = (change, reader.upgrade()) {
            *sink.lock().unwrap() = store.get::<User>(id.as_str()).map(|u| u.name.clone());
        }
    });

    store.insert(User::new("u1", "Alice"));
    assert_eq!(observed.lock().unwrap().as_deref(), Some("Alice"));
}

#[test]
fn removed_listener_stops_receiving() {
    let store = EntityStore::new();
    let seen = Arc::new(Mutex::new(0usize));
    let sink = Arc::clone(&seen);
    let id = store.on_change(move |_| *sink.lock().unwrap() += 1);

    store.insert(User::new("u1", "Alice"));
    assert!(store.remove_listener(id));
    store.insert(User::new("u2", "Bob"));

    assert_eq!(*seen.lock().unwrap(), 1);
}

#[test]
fn revision_tracks_every_mutation() {
    let store = EntityStore::new();
    let rx = store.subscribe_revision();
    let start = store.revision();

    store.insert(User::new("u1", "Alice"));
    store.next_sequence(SequenceKind::Incident).unwrap();
    store.delete::<User>("missing");

    assert_eq!(store.revision(), start + 2);
    assert!(rx.has_changed().unwrap());
}

// ── Export ──────────────────────────────────────────────────────────

#[test]
fn export_then_initialize_reproduces_state() {
    let source = EntityStore::new();
    let _ = source.initialize(rich_seed()).unwrap();
    source.next_sequence(SequenceKind::Step).unwrap();
    source.insert(User::new("u0", "Zed"));

    let exported = source.export();
    assert_eq!(exported.users[0].id.as_str(), "u0");
    assert_eq!(exported.sequences.step, Some(2));

    let copy = EntityStore::new();
    let _ = copy.initialize(exported.clone()).unwrap();

    assert_eq!(copy.export(), exported);
    assert_eq!(copy.next_sequence(SequenceKind::Step).unwrap(), 2);
}

// ── End-to-end flows ───────────────────────────────────────────────

#[test]
fn seed_then_read_back() {
    let store = EntityStore::new();
    let _ = store.initialize(alice_seed()).unwrap();

    let alice = store.get::<User>("u1").unwrap();
    assert_eq!(alice.id.as_str(), "u1");
    assert_eq!(alice.name, "Alice");
    assert_eq!(store.entities::<User>().len(), 1);
}

#[test]
fn rename_keeps_id() {
    let store = EntityStore::new();
    let _ = store.initialize(alice_seed()).unwrap();

    store.merge::<User>("u1", &json!({"name": "Alicia"})).unwrap();

    let user = store.get::<User>("u1").unwrap();
    assert_eq!(user.name, "Alicia");
    assert_eq!(user.id.as_str(), "u1");
}

#[test]
fn incident_numbers_follow_sequence() {
    let store = EntityStore::new();
    let _ = store.initialize(alice_seed()).unwrap();

    assert_eq!(store.next_sequence(SequenceKind::Incident).unwrap(), 1000);
    assert_eq!(store.next_sequence(SequenceKind::Incident).unwrap(), 1001);
}

#[test]
fn reset_then_reinitialize() {
    let store = EntityStore::new();
    let _ = store.initialize(alice_seed()).unwrap();

    store.reset();
    assert!(store.entities::<User>().is_empty());

    let again = store.initialize(alice_seed()).unwrap();
    assert!(again.is_applied());
    assert_eq!(store.count::<User>(), 1);
}
