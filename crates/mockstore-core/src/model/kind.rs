// ── Entity and sequence kinds ──
//
// The store keeps one collection per `EntityKind` and one counter per
// `SequenceKind`. Wire names are camelCase; the parsers also accept the
// kebab/snake spellings that are natural on a command line.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumCount, EnumIter, EnumString};

/// One of the eight entity categories tracked by the store.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    EnumCount,
    AsRefStr,
)]
#[serde(rename_all = "camelCase")]
#[strum(ascii_case_insensitive)]
pub enum EntityKind {
    #[strum(to_string = "users", serialize = "user")]
    Users,
    #[strum(to_string = "roles", serialize = "role")]
    Roles,
    #[strum(to_string = "permissions", serialize = "permission")]
    Permissions,
    #[strum(
        to_string = "enhancedPermissions",
        serialize = "enhanced-permissions",
        serialize = "enhanced_permissions",
        serialize = "enhancedPermission"
    )]
    EnhancedPermissions,
    #[strum(to_string = "locations", serialize = "location")]
    Locations,
    #[strum(to_string = "incidents", serialize = "incident")]
    Incidents,
    #[strum(to_string = "steps", serialize = "step")]
    Steps,
    #[strum(to_string = "dictionaries", serialize = "dictionary")]
    Dictionaries,
}

impl EntityKind {
    /// Singular noun for messages ("user", "enhanced permission").
    pub fn singular(self) -> &'static str {
        match self {
            Self::Users => "user",
            Self::Roles => "role",
            Self::Permissions => "permission",
            Self::EnhancedPermissions => "enhanced permission",
            Self::Locations => "location",
            Self::Incidents => "incident",
            Self::Steps => "step",
            Self::Dictionaries => "dictionary",
        }
    }
}

/// Named monotonically increasing counter used to mint human-readable numbers.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    EnumCount,
    AsRefStr,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase", ascii_case_insensitive)]
pub enum SequenceKind {
    Incident,
    Step,
}

impl SequenceKind {
    /// Default first value issued after construction or reset.
    pub const fn default_start(self) -> u64 {
        match self {
            Self::Incident => 1000,
            Self::Step => 1,
        }
    }

    pub(crate) const fn index(self) -> usize {
        match self {
            Self::Incident => 0,
            Self::Step => 1,
        }
    }
}
