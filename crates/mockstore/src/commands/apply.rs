//! `apply` handler: replay a file of store operations.

use serde::Serialize;
use tabled::Tabled;

use mockstore_config as config;
use mockstore_core::{InitOutcome, OpOutcome, StoreOp};

use crate::cli::ApplyArgs;
use crate::error::CliError;
use crate::output;

use super::{Context, dump};

#[derive(Debug, Clone, Serialize, Tabled)]
struct OpRecord {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Op")]
    op: String,
    #[tabled(rename = "Target")]
    target: String,
    #[tabled(rename = "Outcome")]
    outcome: String,
    #[serde(skip)]
    #[tabled(skip)]
    changed: bool,
}

fn describe(op: &StoreOp) -> (&'static str, String) {
    match op {
        StoreOp::Initialize { seed } => (
            "initialize",
            format!("{} entities", seed.counts().values().sum::<usize>()),
        ),
        StoreOp::Reset => ("reset", "-".into()),
        StoreOp::Set { kind, id, .. } => ("set", format!("{kind}/{id}")),
        StoreOp::Update { kind, id, .. } => ("update", format!("{kind}/{id}")),
        StoreOp::Delete { kind, id } => ("delete", format!("{kind}/{id}")),
        StoreOp::NextSequence { sequence } => ("nextSequence", sequence.to_string()),
    }
}

/// Outcome text and whether the op changed the store.
fn outcome_text(outcome: &OpOutcome) -> (String, bool) {
    match outcome {
        OpOutcome::Initialized(InitOutcome::Applied(counts)) => (
            format!("initialized ({} entities)", counts.values().sum::<usize>()),
            true,
        ),
        OpOutcome::Initialized(InitOutcome::Skipped) => {
            ("skipped, already initialized".into(), false)
        }
        OpOutcome::Reset => ("reset".into(), true),
        OpOutcome::Written => ("written".into(), true),
        OpOutcome::Updated(true) => ("updated".into(), true),
        OpOutcome::Deleted(true) => ("deleted".into(), true),
        OpOutcome::Updated(false) | OpOutcome::Deleted(false) => ("not found".into(), false),
        OpOutcome::Sequence(value) => (value.to_string(), true),
    }
}

/// Ops run against the seeded store when a seed is configured, otherwise
/// against an empty one; a file may start with its own `initialize`.
pub fn handle(args: &ApplyArgs, ctx: &Context) -> Result<(), CliError> {
    let ops: Vec<StoreOp> = config::read_document(&args.ops)?;
    let store = ctx.store()?;
    tracing::info!(ops = ops.len(), file = %args.ops.display(), "replaying operations");

    let mut records = Vec::with_capacity(ops.len());
    for (i, op) in ops.into_iter().enumerate() {
        let index = i + 1;
        let (name, target) = describe(&op);
        let outcome = store.apply(op).map_err(|e| CliError::OpFailed {
            index,
            op: name.into(),
            reason: e.to_string(),
        })?;
        let (outcome, changed) = outcome_text(&outcome);
        records.push(OpRecord {
            index,
            op: name.into(),
            target,
            outcome,
            changed,
        });
    }

    let out = if args.dump {
        dump::render_export(&store, ctx.output)?
    } else {
        output::render_list(
            ctx.output,
            &records,
            |r| OpRecord {
                outcome: if r.changed {
                    r.outcome.clone()
                } else {
                    output::muted(&r.outcome, ctx.color)
                },
                ..r.clone()
            },
            |r| format!("{} {} {}", r.op, r.target, r.outcome),
        )?
    };
    output::print_output(&out, ctx.quiet);
    Ok(())
}
