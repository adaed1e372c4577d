//! `dump` handler.

use strum::IntoEnumIterator;

use mockstore_core::{EntityKind, EntityStore};

use crate::cli::OutputFormat;
use crate::error::CliError;
use crate::output;

use super::{Context, util};

/// Render the store as seed data. Seed data has no table form, so table
/// output falls back to pretty JSON; plain output lists `kind/id` pairs.
pub fn render_export(store: &EntityStore, format: OutputFormat) -> Result<String, CliError> {
    let seed = store.export();
    if let Some(text) = output::serialized(format, &seed)? {
        return Ok(text);
    }
    if format == OutputFormat::Table {
        return output::json_pretty(&seed);
    }

    let mut lines = Vec::new();
    for kind in EntityKind::iter() {
        for entity in store.values(kind)? {
            lines.push(format!("{kind}/{}", util::cell(&entity, "id")));
        }
    }
    Ok(lines.join("\n"))
}

pub fn handle(ctx: &Context) -> Result<(), CliError> {
    let store = ctx.seeded_store()?;
    let out = render_export(&store, ctx.output)?;
    output::print_output(&out, ctx.quiet);
    Ok(())
}
