// ── Kind-dispatched operations ──
//
// JSON-valued counterparts of the typed operations, for callers that
// only know the entity kind at runtime (CLI, op replay). Each call
// dispatches on `EntityKind` to the typed method of the matching type.

use serde_json::Value;

use super::EntityStore;
use crate::error::CoreError;
use crate::model::{
    Dictionary, EnhancedPermission, Entity, EntityKind, Incident, Location, Permission, Role,
    Step, User,
};

/// Bind `$E` to the entity type stored under `$kind` and evaluate `$body`.
macro_rules! with_entity_type {
    ($kind:expr, $E:ident => $body:expr) => {
        match $kind {
            EntityKind::Users => {
                type $E = User;
                $body
            }
            EntityKind::Roles => {
                type $E = Role;
                $body
            }
            EntityKind::Permissions => {
                type $E = Permission;
                $body
            }
            EntityKind::EnhancedPermissions => {
                type $E = EnhancedPermission;
                $body
            }
            EntityKind::Locations => {
                type $E = Location;
                $body
            }
            EntityKind::Incidents => {
                type $E = Incident;
                $body
            }
            EntityKind::Steps => {
                type $E = Step;
                $body
            }
            EntityKind::Dictionaries => {
                type $E = Dictionary;
                $body
            }
        }
    };
}

impl EntityStore {
    /// Look up one entity as JSON.
    pub fn get_value(&self, kind: EntityKind, id: &str) -> Result<Option<Value>, CoreError> {
        with_entity_type!(kind, E => {
            self.get::<E>(id)
                .map(|e| serde_json::to_value(&*e))
                .transpose()
                .map_err(CoreError::from)
        })
    }

    /// Every entity of a kind as JSON, sorted by id.
    pub fn values(&self, kind: EntityKind) -> Result<Vec<Value>, CoreError> {
        with_entity_type!(kind, E => {
            let snapshot = self.entities::<E>();
            let mut items: Vec<&E> = snapshot.iter().map(|e| &**e).collect();
            items.sort_by(|a, b| a.id().cmp(b.id()));
            items
                .into_iter()
                .map(|e| serde_json::to_value(e).map_err(CoreError::from))
                .collect()
        })
    }

    /// Insert or overwrite an entity given as JSON.
    ///
    /// The JSON must describe a complete entity of `kind`; its `id`
    /// field may be omitted since the key wins.
    pub fn set_value(&self, kind: EntityKind, id: &str, entity: Value) -> Result<(), CoreError> {
        let entity = with_id(entity, id);
        with_entity_type!(kind, E => {
            let typed: E = serde_json::from_value(entity).map_err(|e| CoreError::InvalidEntity {
                kind,
                message: e.to_string(),
            })?;
            self.set::<E>(id, typed);
            Ok(())
        })
    }

    /// Shallow-merge a JSON object onto an existing entity.
    ///
    /// Returns `Ok(false)` when nothing is stored under `id`.
    pub fn merge_value(&self, kind: EntityKind, id: &str, patch: &Value) -> Result<bool, CoreError> {
        with_entity_type!(kind, E => {
            self.merge::<E>(id, patch).map(|updated| updated.is_some())
        })
    }

    /// Remove an entity. Returns `false` when it was not present.
    pub fn delete_value(&self, kind: EntityKind, id: &str) -> bool {
        with_entity_type!(kind, E => self.delete::<E>(id).is_some())
    }

    pub fn count_of(&self, kind: EntityKind) -> usize {
        with_entity_type!(kind, E => self.count::<E>())
    }

    pub fn contains_value(&self, kind: EntityKind, id: &str) -> bool {
        with_entity_type!(kind, E => self.contains::<E>(id))
    }
}

/// Fill in a missing `id` so a payload keyed externally still deserializes.
fn with_id(mut entity: Value, id: &str) -> Value {
    if let Value::Object(fields) = &mut entity {
        fields
            .entry("id")
            .or_insert_with(|| Value::String(id.to_owned()));
    }
    entity
}
