// ── Core error types ──
//
// Contract violations such as updating a missing id are silent no-ops.
// Errors exist where data crosses into the store from outside (seed
// files, JSON payloads, names typed on a command line) and where a
// sequence runs out of numbers.

use thiserror::Error;

use crate::model::{EntityKind, SequenceKind};

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Boundary validation ──────────────────────────────────────────
    #[error("Invalid seed data for {kind}: {reason}")]
    InvalidSeed { kind: EntityKind, reason: String },

    #[error("Invalid {kind} entity: {message}")]
    InvalidEntity { kind: EntityKind, message: String },

    #[error("Invalid update for {kind} '{id}': {message}")]
    InvalidPatch {
        kind: EntityKind,
        id: String,
        message: String,
    },

    // ── Name resolution ──────────────────────────────────────────────
    #[error("Unknown entity kind: {name}")]
    UnknownKind { name: String },

    #[error("Unknown sequence: {name}")]
    UnknownSequence { name: String },

    // ── Lookups ──────────────────────────────────────────────────────
    #[error("{} '{id}' not found", .kind.singular())]
    NotFound { kind: EntityKind, id: String },

    // ── Sequences ────────────────────────────────────────────────────
    /// The counter sits at `u64::MAX`; handing that out would wrap to 0.
    #[error("The {kind} sequence is exhausted")]
    SequenceExhausted { kind: SequenceKind },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Lookup miss, for callers that treat an absent id as an error.
    pub fn not_found(kind: EntityKind, id: impl Into<String>) -> Self {
        Self::NotFound { kind, id: id.into() }
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Internal(format!("Serialization error: {err}"))
    }
}
