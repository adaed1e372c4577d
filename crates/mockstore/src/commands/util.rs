//! Shared helpers for command handlers.

use serde_json::Value;
use strum::IntoEnumIterator;

use mockstore_core::{CoreError, EntityKind, SequenceKind};

use crate::error::CliError;

/// Comma-separated canonical kind names, for help text.
pub fn kind_names() -> String {
    EntityKind::iter()
        .map(|k| k.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Resolve a kind typed on the command line (`users`, `user`, `enhanced-permissions`, ...).
pub fn parse_kind(raw: &str) -> Result<EntityKind, CoreError> {
    raw.parse().map_err(|_| CoreError::UnknownKind { name: raw.into() })
}

pub fn parse_sequence(raw: &str) -> Result<SequenceKind, CoreError> {
    raw.parse()
        .map_err(|_| CoreError::UnknownSequence { name: raw.into() })
}

// ── --where filters ─────────────────────────────────────────────────

/// One `field=value` condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFilter {
    pub field: String,
    pub value: String,
}

impl FieldFilter {
    pub fn parse(raw: &str) -> Result<Self, CliError> {
        match raw.split_once('=') {
            Some((field, value)) if !field.trim().is_empty() => Ok(Self {
                field: field.trim().to_owned(),
                value: value.to_owned(),
            }),
            _ => Err(CliError::Validation {
                field: "--where".into(),
                reason: format!("expected FIELD=VALUE, got '{raw}'"),
            }),
        }
    }

    /// Scalars compare by their text form; arrays match when any element does.
    pub fn matches(&self, entity: &Value) -> bool {
        entity
            .get(&self.field)
            .is_some_and(|field| value_matches(field, &self.value))
    }
}

fn value_matches(field: &Value, expected: &str) -> bool {
    match field {
        Value::Null => expected == "null",
        Value::String(s) => s == expected,
        Value::Array(items) => items.iter().any(|item| value_matches(item, expected)),
        Value::Bool(_) | Value::Number(_) | Value::Object(_) => field.to_string() == expected,
    }
}

// ── Display helpers ─────────────────────────────────────────────────

pub fn str_field<'a>(entity: &'a Value, field: &str) -> Option<&'a str> {
    entity.get(field).and_then(Value::as_str)
}

/// Render any JSON scalar for a table cell; `-` when absent.
pub fn cell(entity: &Value, field: &str) -> String {
    match entity.get(field) {
        None | Some(Value::Null) => "-".into(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| v.as_str().map_or_else(|| v.to_string(), str::to_owned))
            .collect::<Vec<_>>()
            .join(", "),
        Some(other) => other.to_string(),
    }
}
