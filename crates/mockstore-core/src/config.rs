// ── Runtime store configuration ──
//
// Describes how a store behaves, never where its data comes from.
// `mockstore-config` builds a `StoreConfig` from files and environment
// and hands it in; core never reads config files.

use serde::{Deserialize, Serialize};

use crate::model::SequenceKind;

/// Starting values the sequence counters return to on construction and reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceDefaults {
    pub incident: u64,
    pub step: u64,
}

impl SequenceDefaults {
    pub fn get(&self, kind: SequenceKind) -> u64 {
        match kind {
            SequenceKind::Incident => self.incident,
            SequenceKind::Step => self.step,
        }
    }
}

impl Default for SequenceDefaults {
    fn default() -> Self {
        Self {
            incident: SequenceKind::Incident.default_start(),
            step: SequenceKind::Step.default_start(),
        }
    }
}

/// Configuration for a single `EntityStore`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreConfig {
    pub sequences: SequenceDefaults,
}
