//! `sequence` handler.

use serde::Serialize;
use tabled::Tabled;

use mockstore_core::SequenceKind;

use crate::cli::SequenceArgs;
use crate::error::CliError;
use crate::output;

use super::{Context, util};

#[derive(Debug, Clone, Copy, Serialize, Tabled)]
struct Draw {
    #[tabled(rename = "Sequence")]
    sequence: SequenceKind,
    #[tabled(rename = "Value")]
    value: u64,
}

/// Draws continue from the seed's sequence values when a seed is configured.
pub fn handle(args: &SequenceArgs, ctx: &Context) -> Result<(), CliError> {
    let sequence = util::parse_sequence(&args.sequence)?;
    let store = ctx.store()?;

    let draws = (0..args.count)
        .map(|_| {
            store
                .next_sequence(sequence)
                .map(|value| Draw { sequence, value })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let out = output::render_list(ctx.output, &draws, |d| *d, |d| d.value.to_string())?;
    output::print_output(&out, ctx.quiet);
    Ok(())
}
