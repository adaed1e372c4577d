//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use mockstore_config::ConfigError;
use mockstore_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Seed ─────────────────────────────────────────────────────────
    #[error("No seed file configured")]
    #[diagnostic(
        code(mockstore::no_seed),
        help(
            "Pass --seed <FILE>, set MOCKSTORE_SEED, or add `seed = \"...\"` to {config_path}"
        )
    )]
    NoSeed { config_path: String },

    #[error("Invalid seed data for {kind}: {reason}")]
    #[diagnostic(
        code(mockstore::invalid_seed),
        help("Every entity needs a non-empty id, unique within its kind.")
    )]
    InvalidSeed { kind: String, reason: String },

    // ── Names ────────────────────────────────────────────────────────
    #[error("Unknown entity kind '{name}'")]
    #[diagnostic(
        code(mockstore::unknown_kind),
        help("Expected one of: {expected}")
    )]
    UnknownKind { name: String, expected: String },

    #[error("Unknown sequence '{name}'")]
    #[diagnostic(code(mockstore::unknown_sequence), help("Expected one of: incident, step"))]
    UnknownSequence { name: String },

    #[error("The {sequence} sequence has no numbers left")]
    #[diagnostic(
        code(mockstore::sequence_exhausted),
        help("Start it lower in the seed's `sequences` table or in the config's `[sequences]`.")
    )]
    SequenceExhausted { sequence: String },

    // ── Entities ─────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(mockstore::not_found),
        help("Run: mockstore {list_command} to see available ids")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("Operation #{index} ({op}) failed: {reason}")]
    #[diagnostic(
        code(mockstore::op_failed),
        help("Operations before #{index} were applied; the rest were skipped.")
    )]
    OpFailed {
        index: usize,
        op: String,
        reason: String,
    },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(mockstore::validation))]
    Validation { field: String, reason: String },

    // ── Data files ───────────────────────────────────────────────────
    #[error("Could not read {path}: {reason}")]
    #[diagnostic(
        code(mockstore::data_file),
        help("Seed and op files must be .json, .yaml, .yml or .toml and match the documented shape.")
    )]
    DataFile { path: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration file already exists at {path}")]
    #[diagnostic(code(mockstore::config_exists), help("Use --force to overwrite it."))]
    ConfigExists { path: String },

    #[error(transparent)]
    #[diagnostic(code(mockstore::config))]
    Config(Box<figment::Error>),

    #[error("Failed to write configuration: {0}")]
    #[diagnostic(code(mockstore::config_write))]
    ConfigWrite(String),

    // ── IO / Internal ────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    #[diagnostic(code(mockstore::internal))]
    Internal(String),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::NoSeed { .. }
            | Self::InvalidSeed { .. }
            | Self::UnknownKind { .. }
            | Self::UnknownSequence { .. }
            | Self::SequenceExhausted { .. }
            | Self::OpFailed { .. }
            | Self::Validation { .. }
            | Self::DataFile { .. }
            | Self::ConfigExists { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidSeed { kind, reason } => CliError::InvalidSeed {
                kind: kind.to_string(),
                reason,
            },

            CoreError::InvalidEntity { kind, message } => CliError::Validation {
                field: kind.singular().into(),
                reason: message,
            },

            CoreError::InvalidPatch { kind, id, message } => CliError::Validation {
                field: format!("{} '{id}'", kind.singular()),
                reason: message,
            },

            CoreError::UnknownKind { name } => CliError::UnknownKind {
                name,
                expected: crate::commands::util::kind_names(),
            },

            CoreError::UnknownSequence { name } => CliError::UnknownSequence { name },

            CoreError::NotFound { kind, id } => CliError::NotFound {
                resource_type: kind.singular().into(),
                identifier: id,
                list_command: format!("list {kind}"),
            },

            CoreError::SequenceExhausted { kind } => CliError::SequenceExhausted {
                sequence: kind.to_string(),
            },

            CoreError::Internal(msg) => CliError::Internal(msg),
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::Figment(inner) => CliError::Config(inner),
            ConfigError::UnsupportedFormat { path } => CliError::DataFile {
                path: path.display().to_string(),
                reason: "unsupported file extension".into(),
            },
            ConfigError::Parse { path, reason } => CliError::DataFile {
                path: path.display().to_string(),
                reason,
            },
            ConfigError::Serialization(e) => CliError::ConfigWrite(e.to_string()),
            ConfigError::Io(e) => CliError::Io(e),
        }
    }
}
