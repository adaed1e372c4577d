// ── Domain model ──
//
// Entity types stored by the `EntityStore`, their shared identity type,
// and the `Entity` trait that ties each type to its collection.

mod access;
mod dictionary;
mod entity_id;
mod incident;
mod kind;
mod location;
mod seed;

use serde::Serialize;
use serde::de::DeserializeOwned;

pub use access::{EnhancedPermission, Permission, PermissionScope, Role, User};
pub use dictionary::{Dictionary, DictionaryEntry};
pub use entity_id::EntityId;
pub use incident::{Incident, IncidentStatus, Severity, Step, StepStatus};
pub use kind::{EntityKind, SequenceKind};
pub use location::Location;
pub use seed::{KindCounts, SeedData, SequenceSeed};

use crate::store::{EntityCollection, EntityStore};

/// A value the store can hold in one of its collections.
///
/// Implemented for the eight domain types only; the associated `KIND`
/// selects the collection a generic store operation works on.
pub trait Entity: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    const KIND: EntityKind;

    fn id(&self) -> &EntityId;

    fn set_id(&mut self, id: EntityId);

    #[doc(hidden)]
    fn collection(store: &EntityStore) -> &EntityCollection<Self>;
}

macro_rules! impl_entity {
    ($($ty:ty => $kind:ident, $field:ident;)*) => {
        $(
            impl Entity for $ty {
                const KIND: EntityKind = EntityKind::$kind;

                fn id(&self) -> &EntityId {
                    &self.id
                }

                fn set_id(&mut self, id: EntityId) {
                    self.id = id;
                }

                fn collection(store: &EntityStore) -> &EntityCollection<Self> {
                    &store.$field
                }
            }
        )*
    };
}

impl_entity! {
    User => Users, users;
    Role => Roles, roles;
    Permission => Permissions, permissions;
    EnhancedPermission => EnhancedPermissions, enhanced_permissions;
    Location => Locations, locations;
    Incident => Incidents, incidents;
    Step => Steps, steps;
    Dictionary => Dictionaries, dictionaries;
}
