//! Output formatting: table, JSON, YAML, plain.
//!
//! Structured formats (`json`, `json-compact`, `yaml`) go through serde and
//! look the same for every command. Table and plain layouts are per-command;
//! lists share `render_list`, single views format themselves.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

/// Labels and headings.
pub fn accent(text: &str, color: bool) -> String {
    if color {
        text.cyan().bold().to_string()
    } else {
        text.to_owned()
    }
}

/// Outcomes that changed nothing.
pub fn muted(text: &str, color: bool) -> String {
    if color {
        text.dimmed().to_string()
    } else {
        text.to_owned()
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Serialize `data` when `format` is one of the structured formats.
///
/// Returns `None` for `table` and `plain`: those layouts belong to the
/// command doing the printing.
pub fn serialized<T>(format: OutputFormat, data: &T) -> Result<Option<String>, CliError>
where
    T: Serialize + ?Sized,
{
    match format {
        OutputFormat::Json => json_pretty(data).map(Some),
        OutputFormat::JsonCompact => serde_json::to_string(data)
            .map(Some)
            .map_err(|e| serialize_failed(&e)),
        OutputFormat::Yaml => serde_yaml::to_string(data)
            .map(|text| Some(text.trim_end().to_owned()))
            .map_err(|e| serialize_failed(&e)),
        OutputFormat::Table | OutputFormat::Plain => Ok(None),
    }
}

/// Pretty-printed JSON, regardless of the selected format.
pub fn json_pretty<T: Serialize + ?Sized>(data: &T) -> Result<String, CliError> {
    serde_json::to_string_pretty(data).map_err(|e| serialize_failed(&e))
}

/// Render a list: structured formats serialize `data` as a whole, table
/// builds one `to_row` per item, plain prints one `line` per item.
pub fn render_list<T, R>(
    format: OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    line: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: Serialize,
    R: Tabled,
{
    if let Some(text) = serialized(format, data)? {
        return Ok(text);
    }
    Ok(match format {
        OutputFormat::Plain => data.iter().map(line).collect::<Vec<_>>().join("\n"),
        _ => render_table(&data.iter().map(to_row).collect::<Vec<_>>()),
    })
}

pub fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

fn serialize_failed(err: &dyn std::fmt::Display) -> CliError {
    CliError::Internal(format!("Failed to serialize output: {err}"))
}
