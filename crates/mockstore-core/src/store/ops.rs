// ── Operation replay ──
//
// A serializable form of every store operation so a session can be
// scripted in a file and replayed through the store's own API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{EntityStore, InitOutcome};
use crate::error::CoreError;
use crate::model::{EntityId, EntityKind, SeedData, SequenceKind};

/// One store operation, tagged by `op` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum StoreOp {
    Initialize {
        #[serde(default)]
        seed: SeedData,
    },
    Reset,
    Set {
        kind: EntityKind,
        id: EntityId,
        entity: Value,
    },
    Update {
        kind: EntityKind,
        id: EntityId,
        changes: Value,
    },
    Delete {
        kind: EntityKind,
        id: EntityId,
    },
    NextSequence {
        sequence: SequenceKind,
    },
}

/// What applying a `StoreOp` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpOutcome {
    Initialized(InitOutcome),
    Reset,
    Written,
    /// `false` when the target did not exist and nothing changed.
    Updated(bool),
    /// `false` when the target did not exist.
    Deleted(bool),
    Sequence(u64),
}

impl EntityStore {
    pub fn apply(&self, op: StoreOp) -> Result<OpOutcome, CoreError> {
        match op {
            StoreOp::Initialize { seed } => self.initialize(seed).map(OpOutcome::Initialized),
            StoreOp::Reset => {
                self.reset();
                Ok(OpOutcome::Reset)
            }
            StoreOp::Set { kind, id, entity } => {
                self.set_value(kind, id.as_str(), entity)?;
                Ok(OpOutcome::Written)
            }
            StoreOp::Update { kind, id, changes } => self
                .merge_value(kind, id.as_str(), &changes)
                .map(OpOutcome::Updated),
            StoreOp::Delete { kind, id } => Ok(OpOutcome::Deleted(self.delete_value(kind, id.as_str()))),
            StoreOp::NextSequence { sequence } => self.next_sequence(sequence).map(OpOutcome::Sequence),
        }
    }

    /// Apply operations in order, stopping at the first error.
    ///
    /// Operations before the failing one stay applied.
    pub fn apply_all(
        &self,
        ops: impl IntoIterator<Item = StoreOp>,
    ) -> Result<Vec<OpOutcome>, CoreError> {
        ops.into_iter().map(|op| self.apply(op)).collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::User;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn ops_parse_from_tagged_json() {
        let ops: Vec<StoreOp> = serde_json::from_value(json!([
            {"op": "initialize", "seed": {"users": [{"id": "u1", "name": "Alice"}]}},
            {"op": "update", "kind": "users", "id": "u1", "changes": {"name": "Alicia"}},
            {"op": "nextSequence", "sequence": "incident"},
            {"op": "delete", "kind": "enhancedPermissions", "id": "ep1"},
            {"op": "reset"}
        ]))
        .unwrap();

        assert_eq!(ops.len(), 5);
        assert_eq!(
            ops[3],
            StoreOp::Delete {
                kind: EntityKind::EnhancedPermissions,
                id: "ep1".into()
            }
        );
    }

    #[test]
    fn replay_runs_through_store_api() {
        let store = EntityStore::new();
        let ops: Vec<StoreOp> = serde_json::from_value(json!([
            {"op": "initialize", "seed": {"users": [{"id": "u1", "name": "Alice"}]}},
            {"op": "initialize"},
            {"op": "update", "kind": "users", "id": "u1", "changes": {"name": "Alicia"}},
            {"op": "update", "kind": "users", "id": "u2", "changes": {"name": "Bob"}},
            {"op": "set", "kind": "users", "id": "u3", "entity": {"name": "Carol"}},
            {"op": "delete", "kind": "users", "id": "u9"},
            {"op": "nextSequence", "sequence": "incident"},
            {"op": "nextSequence", "sequence": "incident"}
        ]))
        .unwrap();

        let outcomes = store.apply_all(ops).unwrap();

        assert!(matches!(outcomes[0], OpOutcome::Initialized(InitOutcome::Applied(_))));
        assert_eq!(outcomes[1], OpOutcome::Initialized(InitOutcome::Skipped));
        assert_eq!(outcomes[2], OpOutcome::Updated(true));
        assert_eq!(outcomes[3], OpOutcome::Updated(false));
        assert_eq!(outcomes[4], OpOutcome::Written);
        assert_eq!(outcomes[5], OpOutcome::Deleted(false));
        assert_eq!(outcomes[6], OpOutcome::Sequence(1000));
        assert_eq!(outcomes[7], OpOutcome::Sequence(1001));

        assert_eq!(store.get::<User>("u1").unwrap().name, "Alicia");
        assert!(store.get::<User>("u2").is_none());
        assert_eq!(store.count::<User>(), 2);
    }

    #[test]
    fn replay_stops_at_first_error() {
        let store = EntityStore::new();
        let ops = vec![
            StoreOp::Set {
                kind: EntityKind::Roles,
                id: "r1".into(),
                entity: json!({"name": "Admin"}),
            },
            StoreOp::Set {
                kind: EntityKind::Roles,
                id: "r2".into(),
                entity: json!("not an object"),
            },
            StoreOp::Reset,
        ];

        assert!(store.apply_all(ops).is_err());
        assert_eq!(store.count_of(EntityKind::Roles), 1);
        assert!(store.last_reset_at().is_none());
    }
}
