// ── Dictionary domain type ──
//
// Lookup tables (categories, causes, units) used to populate pickers.

use serde::{Deserialize, Serialize};

use super::entity_id::EntityId;

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DictionaryEntry {
    pub code: String,
    pub label: String,
    #[serde(default = "default_true")]
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dictionary {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub entries: Vec<DictionaryEntry>,
}

impl Dictionary {
    pub fn label_for(&self, code: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.code == code)
            .map(|e| e.label.as_str())
    }

    /// Entries still offered for selection.
    pub fn active_entries(&self) -> impl Iterator<Item = &DictionaryEntry> {
        self.entries.iter().filter(|e| e.active)
    }
}
