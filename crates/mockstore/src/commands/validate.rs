//! `validate` handler.
//!
//! Seeding a fresh store runs the same checks `initialize` applies, so a
//! seed that validates here loads anywhere.

use serde::Serialize;
use strum::IntoEnumIterator;
use tabled::Tabled;

use mockstore_core::{EntityKind, KindCounts, SequenceKind};

use crate::cli::OutputFormat;
use crate::error::CliError;
use crate::output;

use super::Context;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Report {
    counts: KindCounts,
    total: usize,
    next_incident_number: u64,
    next_step_number: u64,
}

#[derive(Tabled)]
struct CountRow {
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Count")]
    count: usize,
}

fn summary(report: &Report, color: bool) -> String {
    let rows: Vec<CountRow> = EntityKind::iter()
        .map(|kind| CountRow {
            kind: kind.to_string(),
            count: report.counts.get(&kind).copied().unwrap_or(0),
        })
        .collect();
    [
        output::render_table(&rows),
        format!(
            "{} {} entities, next incident #{}, next step #{}",
            output::accent("Seed OK:", color),
            report.total,
            report.next_incident_number,
            report.next_step_number
        ),
    ]
    .join("\n")
}

fn plain(report: &Report) -> String {
    report
        .counts
        .iter()
        .map(|(kind, count)| format!("{kind} {count}"))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn handle(ctx: &Context) -> Result<(), CliError> {
    let store = ctx.seeded_store()?;
    let counts = store.counts();
    let report = Report {
        total: counts.values().sum(),
        counts,
        next_incident_number: store.peek_sequence(SequenceKind::Incident),
        next_step_number: store.peek_sequence(SequenceKind::Step),
    };

    let out = match output::serialized(ctx.output, &report)? {
        Some(text) => text,
        None if ctx.output == OutputFormat::Plain => plain(&report),
        None => summary(&report, ctx.color),
    };
    output::print_output(&out, ctx.quiet);
    Ok(())
}
