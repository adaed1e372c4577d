//! Shared configuration for mockstore tools.
//!
//! TOML config file + `MOCKSTORE_` environment overrides, seed and op
//! file loading, and translation to `mockstore_core::StoreConfig`.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use mockstore_core::{SeedData, SequenceDefaults, SequenceKind, StoreConfig};

const OUTPUT_FORMATS: &[&str] = &["table", "json", "json-compact", "yaml", "plain"];
const COLOR_MODES: &[&str] = &["auto", "always", "never"];

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("unsupported file format for {}: expected .json, .yaml, .yml or .toml", path.display())]
    UnsupportedFormat { path: PathBuf },

    #[error("failed to parse {}: {reason}", path.display())]
    Parse { path: PathBuf, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Seed file loaded when no `--seed` flag is given.
    pub seed: Option<PathBuf>,

    /// Output defaults for the CLI.
    #[serde(default)]
    pub defaults: Defaults,

    /// Starting values for the sequence counters.
    #[serde(default)]
    pub sequences: SequenceConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct SequenceConfig {
    #[serde(default = "default_incident_start")]
    pub incident: u64,

    #[serde(default = "default_step_start")]
    pub step: u64,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            incident: default_incident_start(),
            step: default_step_start(),
        }
    }
}

fn default_incident_start() -> u64 {
    SequenceKind::Incident.default_start()
}
fn default_step_start() -> u64 {
    SequenceKind::Step.default_start()
}

impl Config {
    /// Reject values the CLI cannot act on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_choice("defaults.output", &self.defaults.output, OUTPUT_FORMATS)?;
        check_choice("defaults.color", &self.defaults.color, COLOR_MODES)?;
        Ok(())
    }

    /// Translate into the store's runtime configuration.
    pub fn to_store_config(&self) -> StoreConfig {
        StoreConfig {
            sequences: SequenceDefaults {
                incident: self.sequences.incident,
                step: self.sequences.step,
            },
        }
    }
}

fn check_choice(field: &str, value: &str, allowed: &[&str]) -> Result<(), ConfigError> {
    if allowed.contains(&value) {
        return Ok(());
    }
    Err(ConfigError::Validation {
        field: field.into(),
        reason: format!("expected one of {}, got '{value}'", allowed.join(", ")),
    })
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "mockstore", "mockstore").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("mockstore");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from file + environment.
///
/// `path` overrides the platform config location. A missing file is not
/// an error; defaults and environment still apply.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = path.map_or_else(config_path, Path::to_path_buf);
    tracing::debug!(path = %path.display(), "loading config");

    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(&path))
        .merge(Env::prefixed("MOCKSTORE_").split("_"));

    let config: Config = figment.extract()?;
    config.validate()?;
    Ok(config)
}

/// Load config, returning a default if loading fails.
pub fn load_config_or_default(path: Option<&Path>) -> Config {
    load_config(path).unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`, creating parent dirs.
pub fn save_config(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Data files ──────────────────────────────────────────────────────

/// Serialization format of a seed or op file, picked by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Yaml,
    Toml,
}

impl FileFormat {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("json") => Ok(Self::Json),
            Some("yaml" | "yml") => Ok(Self::Yaml),
            Some("toml") => Ok(Self::Toml),
            _ => Err(ConfigError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}

/// Read and deserialize a JSON, YAML or TOML document.
pub fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let format = FileFormat::from_path(path)?;
    let raw = std::fs::read_to_string(path)?;
    let parse_err = |reason: String| ConfigError::Parse {
        path: path.to_path_buf(),
        reason,
    };
    match format {
        FileFormat::Json => serde_json::from_str(&raw).map_err(|e| parse_err(e.to_string())),
        FileFormat::Yaml => serde_yaml::from_str(&raw).map_err(|e| parse_err(e.to_string())),
        FileFormat::Toml => toml::from_str(&raw).map_err(|e| parse_err(e.to_string())),
    }
}

/// Load seed data from a file. Structure is checked here; id rules are
/// enforced by the store on `initialize`.
pub fn load_seed(path: &Path) -> Result<SeedData, ConfigError> {
    let seed: SeedData = read_document(path)?;
    tracing::debug!(path = %path.display(), entities = seed.counts().values().sum::<usize>(), "seed loaded");
    Ok(seed)
}
