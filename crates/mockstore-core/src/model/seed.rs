// ── Seed data ──
//
// The initial entity arrays handed to `EntityStore::initialize`. Every
// array is optional on the wire; omitted kinds stay empty and omitted
// sequence values fall back to the store's configured defaults.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use super::{
    Dictionary, EnhancedPermission, Entity, EntityKind, Incident, Location, Permission, Role,
    SequenceKind, Step, User,
};
use crate::error::CoreError;

/// Number of entities per kind.
pub type KindCounts = BTreeMap<EntityKind, usize>;

/// Optional starting values for the sequence counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SequenceSeed {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incident: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<u64>,
}

impl SequenceSeed {
    pub fn get(&self, kind: SequenceKind) -> Option<u64> {
        match kind {
            SequenceKind::Incident => self.incident,
            SequenceKind::Step => self.step,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SeedData {
    pub users: Vec<User>,
    pub roles: Vec<Role>,
    pub permissions: Vec<Permission>,
    pub enhanced_permissions: Vec<EnhancedPermission>,
    pub locations: Vec<Location>,
    pub incidents: Vec<Incident>,
    pub steps: Vec<Step>,
    pub dictionaries: Vec<Dictionary>,
    pub sequences: SequenceSeed,
}

impl SeedData {
    /// Reject entities without a usable id and ids repeated within a kind.
    ///
    /// A repeated id would otherwise collapse two seed entries into one
    /// without any trace.
    pub fn validate(&self) -> Result<(), CoreError> {
        check_ids(&self.users)?;
        check_ids(&self.roles)?;
        check_ids(&self.permissions)?;
        check_ids(&self.enhanced_permissions)?;
        check_ids(&self.locations)?;
        check_ids(&self.incidents)?;
        check_ids(&self.steps)?;
        check_ids(&self.dictionaries)?;
        Ok(())
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

    pub fn is_empty(&self) -> bool {
        self.counts().values().all(|n| *n == 0)
    }
}

fn check_ids<E: Entity>(items: &[E]) -> Result<(), CoreError> {
    let mut seen = HashSet::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let id = item.id();
        if id.is_blank() {
            return Err(CoreError::InvalidSeed {
                kind: E::KIND,
                reason: format!("entry {index} has an empty id"),
            });
        }
        if !seen.insert(id.as_str()) {
            return Err(CoreError::InvalidSeed {
                kind: E::KIND,
                reason: format!("duplicate id '{id}' at entry {index}"),
            });
        }
    }
    Ok(())
}
