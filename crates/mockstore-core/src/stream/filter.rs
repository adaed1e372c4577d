// ── Filter predicates for entity snapshots ──
//
// Used to narrow snapshots without copying collections.

use crate::model::*;

/// A predicate over one entity type.
pub trait EntityFilter<T> {
    fn matches(&self, item: &T) -> bool;
}

/// Filter predicate for user collections.
pub enum UserFilter {
    All,
    Active,
    Inactive,
    ByRole(EntityId),
    ByLocation(EntityId),
    Custom(Box<dyn Fn(&User) -> bool + Send + Sync>),
}

impl EntityFilter<User> for UserFilter {
    fn matches(&self, user: &User) -> bool {
        match self {
            Self::All => true,
            Self::Active => user.active,
            Self::Inactive => !user.active,
            Self::ByRole(role) => user.has_role(role),
            Self::ByLocation(loc) => user.location_id.as_ref() == Some(loc),
            Self::Custom(f) => f(user),
        }
    }
}

/// Filter predicate for incident collections.
pub enum IncidentFilter {
    All,
    /// Open or in progress.
    Open,
    ByStatus(IncidentStatus),
    /// At or above the given severity.
    BySeverity(Severity),
    ByLocation(EntityId),
    AssignedTo(EntityId),
    Custom(Box<dyn Fn(&Incident) -> bool + Send + Sync>),
}

impl EntityFilter<Incident> for IncidentFilter {
    fn matches(&self, incident: &Incident) -> bool {
        match self {
            Self::All => true,
            Self::Open => incident.status.is_active(),
            Self::ByStatus(status) => incident.status == *status,
            Self::BySeverity(min) => incident.severity >= *min,
            Self::ByLocation(loc) => incident.location_id.as_ref() == Some(loc),
            Self::AssignedTo(user) => incident.assignee_id.as_ref() == Some(user),
            Self::Custom(f) => f(incident),
        }
    }
}

/// Filter predicate for step collections.
pub enum StepFilter {
    All,
    ByIncident(EntityId),
    ByStatus(StepStatus),
    Custom(Box<dyn Fn(&Step) -> bool + Send + Sync>),
}

impl EntityFilter<Step> for StepFilter {
    fn matches(&self, step: &Step) -> bool {
        match self {
            Self::All => true,
            Self::ByIncident(id) => step.incident_id == *id,
            Self::ByStatus(status) => step.status == *status,
            Self::Custom(f) => f(step),
        }
    }
}

impl<T, F> EntityFilter<T> for F
where
    F: Fn(&T) -> bool,
{
    fn matches(&self, item: &T) -> bool {
        self(item)
    }
}
