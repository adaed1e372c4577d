// ── Access-control domain types ──
//
// Users, roles and the two permission flavours. Cross-references are by
// id only; the store never checks that a referenced role or location
// exists.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::entity_id::EntityId;

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: EntityId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub role_ids: Vec<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_id: Option<EntityId>,
    #[serde(default = "default_true")]
    pub active: bool,
}

impl User {
    pub fn new(id: impl Into<EntityId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: None,
            role_ids: Vec::new(),
            location_id: None,
            active: true,
        }
    }

    pub fn has_role(&self, role: &EntityId) -> bool {
        self.role_ids.contains(role)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: EntityId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub permission_ids: Vec<EntityId>,
}

/// Flat resource/action grant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    pub id: EntityId,
    pub name: String,
    pub resource: String,
    pub action: String,
}

/// Where an enhanced permission applies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PermissionScope {
    #[default]
    Global,
    Location,
    Own,
}

/// Permission carrying several actions, a scope and free-form conditions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancedPermission {
    pub id: EntityId,
    pub name: String,
    pub resource: String,
    #[serde(default)]
    pub actions: Vec<String>,
    #[serde(default)]
    pub scope: PermissionScope,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub conditions: BTreeMap<String, serde_json::Value>,
}

impl EnhancedPermission {
    pub fn allows(&self, action: &str) -> bool {
        self.actions.iter().any(|a| a == action || a == "*")
    }
}
