//! Command handlers and the shared execution context.

pub mod apply;
pub mod config_cmd;
pub mod dump;
pub mod entities;
pub mod sequence;
pub mod util;
pub mod validate;

use std::path::PathBuf;

use clap::ValueEnum;

use mockstore_config::{self as config, Config};
use mockstore_core::EntityStore;

use crate::cli::{ColorMode, Command, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

/// Global flags resolved against the config file.
pub struct Context {
    pub config: Config,
    pub config_path: PathBuf,
    pub output: OutputFormat,
    pub color: bool,
    pub quiet: bool,
    seed: Option<PathBuf>,
}

impl Context {
    /// Flags win over config values, config values over built-in defaults.
    pub fn resolve(global: &GlobalOpts) -> Result<Self, CliError> {
        let config_path = global.config.clone().unwrap_or_else(config::config_path);
        let cfg = config::load_config(Some(&config_path))?;
        Self::build(global, config_path, cfg)
    }

    /// Like `resolve`, but a broken config file falls back to defaults so
    /// `config` subcommands can still inspect or replace it.
    pub fn resolve_lenient(global: &GlobalOpts) -> Result<Self, CliError> {
        let config_path = global.config.clone().unwrap_or_else(config::config_path);
        let cfg = config::load_config_or_default(Some(&config_path));
        Self::build(global, config_path, cfg)
    }

    fn build(global: &GlobalOpts, config_path: PathBuf, cfg: Config) -> Result<Self, CliError> {
        let output = match global.output {
            Some(format) => format,
            None => parse_choice::<OutputFormat>("defaults.output", &cfg.defaults.output)?,
        };
        let color_mode = match global.color {
            Some(mode) => mode,
            None => parse_choice::<ColorMode>("defaults.color", &cfg.defaults.color)?,
        };

        Ok(Self {
            seed: global.seed.clone().or_else(|| cfg.seed.clone()),
            config: cfg,
            config_path,
            output,
            color: output::should_color(color_mode),
            quiet: global.quiet,
        })
    }

    /// A store built with the configured sequence defaults, seeded from the
    /// seed file. Fails when no seed file is configured.
    pub fn seeded_store(&self) -> Result<EntityStore, CliError> {
        let path = self.seed.as_deref().ok_or_else(|| CliError::NoSeed {
            config_path: self.config_path.display().to_string(),
        })?;
        let store = self.empty_store();
        let seed = config::load_seed(path)?;
        let outcome = store.initialize(seed)?;
        tracing::info!(seed = %path.display(), applied = outcome.is_applied(), "store seeded");
        Ok(store)
    }

    /// Seeded when a seed file is configured, otherwise empty and
    /// uninitialized.
    pub fn store(&self) -> Result<EntityStore, CliError> {
        if self.seed.is_some() {
            self.seeded_store()
        } else {
            Ok(self.empty_store())
        }
    }

    fn empty_store(&self) -> EntityStore {
        EntityStore::with_config(self.config.to_store_config())
    }
}

fn parse_choice<T: ValueEnum>(field: &str, raw: &str) -> Result<T, CliError> {
    T::from_str(raw, true).map_err(|reason| CliError::Validation {
        field: field.into(),
        reason,
    })
}

/// Route a parsed command to its handler.
pub fn dispatch(cmd: Command, ctx: &Context) -> Result<(), CliError> {
    match cmd {
        Command::List(args) => entities::list(&args, ctx),
        Command::Get(args) => entities::get(&args, ctx),
        Command::Sequence(args) => sequence::handle(&args, ctx),
        Command::Validate => validate::handle(ctx),
        Command::Apply(args) => apply::handle(&args, ctx),
        Command::Dump => dump::handle(ctx),
        Command::Config(args) => config_cmd::handle(args, ctx),
        Command::Completions(_) => Err(CliError::Internal(
            "completions are generated before dispatch".into(),
        )),
    }
}
