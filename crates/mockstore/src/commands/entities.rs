//! `list` and `get` handlers.
//!
//! Both work on the kind-dispatched JSON view of the store, so one row
//! type and one detail view cover every entity kind.

use serde_json::Value;
use tabled::Tabled;

use mockstore_core::{CoreError, EntityKind};

use crate::cli::{GetArgs, ListArgs, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::Context;
use super::util::{self, FieldFilter};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct EntityRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Details")]
    details: String,
}

impl EntityRow {
    fn new(kind: EntityKind, entity: &Value) -> Self {
        Self {
            id: util::cell(entity, "id"),
            name: util::str_field(entity, "name")
                .or_else(|| util::str_field(entity, "title"))
                .unwrap_or("-")
                .to_owned(),
            details: summary_fields(kind)
                .iter()
                .filter_map(|field| match entity.get(*field) {
                    None | Some(Value::Null) => None,
                    Some(_) => Some(format!("{field}: {}", util::cell(entity, field))),
                })
                .collect::<Vec<_>>()
                .join("  "),
        }
    }
}

/// Fields worth a glance in list view, per kind.
fn summary_fields(kind: EntityKind) -> &'static [&'static str] {
    match kind {
        EntityKind::Users => &["email", "roleIds", "active"],
        EntityKind::Roles => &["permissionIds"],
        EntityKind::Permissions => &["resource", "action"],
        EntityKind::EnhancedPermissions => &["resource", "actions", "scope"],
        EntityKind::Locations => &["code", "parentId"],
        EntityKind::Incidents => &["number", "status", "severity", "assigneeId"],
        EntityKind::Steps => &["incidentId", "number", "status", "order"],
        EntityKind::Dictionaries => &[],
    }
}

fn detail(entity: &Value, color: bool) -> String {
    let Some(fields) = entity.as_object() else {
        return entity.to_string();
    };
    let width = fields.keys().map(String::len).max().unwrap_or(0) + 1;
    fields
        .iter()
        .map(|(key, value)| {
            let label = format!("{key}:");
            let shown = match value {
                Value::Array(items) if items.iter().any(Value::is_object) => {
                    format!("{} item(s)", items.len())
                }
                Value::Object(_) => value.to_string(),
                _ => util::cell(entity, key),
            };
            format!("{} {shown}", output::accent(&format!("{label:<width$}"), color))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn id_of(entity: &Value) -> String {
    util::cell(entity, "id")
}

// ── Handlers ────────────────────────────────────────────────────────

pub fn list(args: &ListArgs, ctx: &Context) -> Result<(), CliError> {
    let kind = util::parse_kind(&args.kind)?;
    let filters = args
        .filters
        .iter()
        .map(|raw| FieldFilter::parse(raw))
        .collect::<Result<Vec<_>, _>>()?;

    let store = ctx.seeded_store()?;
    let items: Vec<Value> = store
        .values(kind)?
        .into_iter()
        .filter(|entity| filters.iter().all(|f| f.matches(entity)))
        .collect();
    tracing::debug!(%kind, matched = items.len(), total = store.count_of(kind), "listing");

    let out = output::render_list(ctx.output, &items, |e| EntityRow::new(kind, e), id_of)?;
    output::print_output(&out, ctx.quiet);
    Ok(())
}

pub fn get(args: &GetArgs, ctx: &Context) -> Result<(), CliError> {
    let kind = util::parse_kind(&args.kind)?;
    let store = ctx.seeded_store()?;
    let entity = store
        .get_value(kind, &args.id)?
        .ok_or_else(|| CoreError::not_found(kind, &args.id))?;

    let out = match output::serialized(ctx.output, &entity)? {
        Some(text) => text,
        None if ctx.output == OutputFormat::Plain => id_of(&entity),
        None => detail(&entity, ctx.color),
    };
    output::print_output(&out, ctx.quiet);
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn row_uses_title_when_no_name() {
        let incident = json!({
            "id": "i1", "number": 1000, "title": "Water leak",
            "status": "open", "severity": "high", "assigneeId": null
        });
        let row = EntityRow::new(EntityKind::Incidents, &incident);
        assert_eq!(row.name, "Water leak");
        assert_eq!(row.details, "number: 1000  status: open  severity: high");
    }

    #[test]
    fn detail_lists_every_field() {
        let user = json!({"id": "u1", "name": "Alice", "roleIds": ["r1"]});
        let text = detail(&user, false);
        assert!(text.contains("name:"));
        assert!(text.contains("Alice"));
        assert!(text.contains("r1"));
        assert_eq!(text.lines().count(), 3);
    }
}
