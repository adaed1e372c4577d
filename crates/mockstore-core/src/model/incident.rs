// ── Incident and step domain types ──
//
// Incidents and their steps carry a human-readable `number` minted from
// the store's sequence counters; the `id` stays the lookup key.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity_id::EntityId;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IncidentStatus {
    #[default]
    Open,
    InProgress,
    Resolved,
    Closed,
}

impl IncidentStatus {
    /// Open or in progress.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Open | Self::InProgress)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Severity {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Incident {
    pub id: EntityId,
    pub number: u64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub status: IncidentStatus,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reported_by: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<EntityId>,
    #[serde(default)]
    pub step_ids: Vec<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Incident {
    pub fn new(id: impl Into<EntityId>, number: u64, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            number,
            title: title.into(),
            description: None,
            status: IncidentStatus::default(),
            severity: Severity::default(),
            location_id: None,
            reported_by: None,
            assignee_id: None,
            step_ids: Vec::new(),
            created_at: None,
            updated_at: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StepStatus {
    #[default]
    Pending,
    InProgress,
    Done,
    Skipped,
}

/// One action item within an incident.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub id: EntityId,
    pub number: u64,
    pub incident_id: EntityId,
    pub title: String,
    #[serde(default)]
    pub status: StepStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<EntityId>,
    #[serde(default)]
    pub order: u32,
}

impl Step {
    pub fn new(
        id: impl Into<EntityId>,
        number: u64,
        incident_id: impl Into<EntityId>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            number,
            incident_id: incident_id.into(),
            title: title.into(),
            status: StepStatus::default(),
            assignee_id: None,
            order: 0,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn incident_parses_with_defaults() {
        let inc: Incident =
            serde_json::from_str(r#"{"id":"i1","number":1000,"title":"Leak"}"#).unwrap();
        assert_eq!(inc.status, IncidentStatus::Open);
        assert_eq!(inc.severity, Severity::Medium);
        assert!(inc.status.is_active());
        assert!(inc.step_ids.is_empty());
    }

    #[test]
    fn status_wire_names() {
        let json = serde_json::to_string(&IncidentStatus::InProgress).unwrap();
        assert_eq!(json, "\"inProgress\"");
        assert!(!IncidentStatus::Closed.is_active());
    }

    #[test]
    fn severity_orders_by_urgency() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::Low < Severity::Medium);
    }

    #[test]
    fn step_requires_incident() {
        let err =
            serde_json::from_str::<Step>(r#"{"id":"s1","number":1,"title":"Call"}"#).unwrap_err();
        assert!(err.to_string().contains("incidentId"));
    }
}
