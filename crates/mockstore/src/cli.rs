//! Clap derive structures for the `mockstore` CLI.
//!
//! Defines the command tree, global flags, and shared types. Kind and
//! sequence names stay plain strings here and are resolved by the command
//! handlers, so this file builds on its own from `build.rs`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// mockstore -- seed, inspect and script a mock entity store
#[derive(Debug, Parser)]
#[command(
    name = "mockstore",
    version,
    about = "Seed, inspect and script an in-memory mock entity store",
    long_about = "Loads seed data (users, roles, permissions, locations, incidents,\n\
        steps, dictionaries) into an in-memory store and runs store\n\
        operations against it, so fixtures can be checked and replayed\n\
        without a backend.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config file (defaults to the platform config directory)
    #[arg(long, env = "MOCKSTORE_CONFIG", global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Seed file to load (.json, .yaml, .yml, .toml)
    #[arg(long, short = 's', global = true, value_name = "FILE")]
    pub seed: Option<PathBuf>,

    /// Output format (defaults to `defaults.output` from config)
    #[arg(long, short = 'o', env = "MOCKSTORE_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List entities of one kind
    #[command(alias = "ls")]
    List(ListArgs),

    /// Show a single entity
    Get(GetArgs),

    /// Draw numbers from a sequence counter
    #[command(alias = "seq")]
    Sequence(SequenceArgs),

    /// Load the seed into a fresh store and report per-kind counts
    Validate,

    /// Replay a file of store operations
    Apply(ApplyArgs),

    /// Print the seeded store contents as seed data
    Dump,

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  ENTITIES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Entity kind (users, roles, permissions, enhancedPermissions,
    /// locations, incidents, steps, dictionaries)
    pub kind: String,

    /// Keep entities whose field equals the value (repeatable, ANDed)
    /// Examples: --where active=true, --where roleIds=r-admin
    #[arg(long = "where", short = 'w', value_name = "FIELD=VALUE")]
    pub filters: Vec<String>,
}

#[derive(Debug, Args)]
pub struct GetArgs {
    /// Entity kind
    pub kind: String,

    /// Entity id
    pub id: String,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SEQUENCES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct SequenceArgs {
    /// Sequence name (incident or step)
    pub sequence: String,

    /// How many numbers to draw
    #[arg(long, short = 'n', default_value = "1", value_parser = clap::value_parser!(u32).range(1..))]
    pub count: u32,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  REPLAY
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ApplyArgs {
    /// File holding a list of operations (.json, .yaml, .yml)
    pub ops: PathBuf,

    /// Print the resulting store contents instead of per-op outcomes
    #[arg(long)]
    pub dump: bool,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Write a config file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Display current resolved configuration
    Show,

    /// Print the config file location
    Path,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
