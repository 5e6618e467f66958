use anyhow::{Result, anyhow};
use comfy_table::Cell;
use serde_json::json;
use spacenote_core::admin::{ConditionDraft, FilterDraft};
use spacenote_core::fields::{self, format_value};
use spacenote_core::{AppContext, Route};
use spacenote_models::FilterCondition;

use crate::cli::FilterCommands;
use crate::commands::utils::{require_auth, success};
use crate::output::table::{new_table, print_table};
use crate::output::{OutputFormat, json::print_json};

pub async fn run(ctx: &AppContext, command: FilterCommands, format: OutputFormat) -> Result<()> {
    match command {
        FilterCommands::List { space } => list_filters(ctx, &space, format).await,
        FilterCommands::Create {
            space,
            id,
            title,
            description,
            conditions,
            sort,
            list_fields,
        } => {
            let conditions = conditions
                .iter()
                .map(|raw| {
                    ConditionDraft::parse(raw)
                        .ok_or_else(|| anyhow!("Invalid condition '{raw}', expected field:operator:value"))
                })
                .collect::<Result<Vec<_>>>()?;
            let draft = FilterDraft {
                id,
                title,
                description,
                conditions,
                sort,
                list_fields,
            };
            create_filter(ctx, &space, &draft, format).await
        }
        FilterCommands::Delete { space, id } => delete_filter(ctx, &space, &id, format).await,
        FilterCommands::Operators { space } => list_operators(ctx, &space, format).await,
    }
}

async fn list_filters(ctx: &AppContext, space_id: &str, format: OutputFormat) -> Result<()> {
    require_auth(ctx, Route::SpaceFilters { space_id: space_id.to_string() })?;
    let space = ctx.space(space_id).await?;

    if format.is_json() {
        return print_json(&space.filters);
    }

    if space.filters.is_empty() {
        println!("No filters in {space_id}.");
        return Ok(());
    }

    let mut table = new_table(["ID", "Title", "Conditions", "Sort", "Columns"]);
    for filter in &space.filters {
        let conditions: Vec<String> = filter.conditions.iter().map(describe_condition).collect();
        table.add_row(vec![
            Cell::new(&filter.id),
            Cell::new(&filter.title),
            Cell::new(conditions.join("\n")),
            Cell::new(filter.sort.join(", ")),
            Cell::new(filter.list_fields.join(", ")),
        ]);
    }
    print_table(table)
}

fn describe_condition(condition: &FilterCondition) -> String {
    format!(
        "{} {} {}",
        condition.field,
        condition.operator.label(),
        format_value(Some(&condition.value))
    )
}

async fn create_filter(
    ctx: &AppContext,
    space_id: &str,
    draft: &FilterDraft,
    format: OutputFormat,
) -> Result<()> {
    require_auth(ctx, Route::CreateFilter { space_id: space_id.to_string() })?;
    let filter = ctx.create_filter(space_id, draft).await?;

    if format.is_json() {
        return print_json(&filter);
    }

    success(format!("Filter created: {}", filter.id));
    Ok(())
}

async fn delete_filter(
    ctx: &AppContext,
    space_id: &str,
    filter_id: &str,
    format: OutputFormat,
) -> Result<()> {
    require_auth(ctx, Route::SpaceFilters { space_id: space_id.to_string() })?;
    ctx.delete_filter(space_id, filter_id).await?;

    if format.is_json() {
        return print_json(&json!({ "deleted": true, "id": filter_id }));
    }

    success(format!("Filter deleted: {filter_id}"));
    Ok(())
}

async fn list_operators(ctx: &AppContext, space_id: &str, format: OutputFormat) -> Result<()> {
    require_auth(ctx, Route::CreateFilter { space_id: space_id.to_string() })?;
    let space = ctx.space(space_id).await?;
    let rows: Vec<_> = fields::filterable_fields(&space)
        .into_iter()
        .map(|(name, field_type)| (name, field_type, fields::operators(field_type)))
        .collect();

    if format.is_json() {
        let value: Vec<_> = rows
            .iter()
            .map(|(name, field_type, operators)| {
                json!({
                    "field": name,
                    "type": field_type,
                    "operators": operators,
                })
            })
            .collect();
        return print_json(&value);
    }

    let mut table = new_table(["Field", "Type", "Operators"]);
    for (name, field_type, operators) in rows {
        let labels: Vec<String> = operators
            .iter()
            .map(|op| format!("{} ({})", op.as_str(), op.label()))
            .collect();
        table.add_row(vec![
            Cell::new(name),
            Cell::new(field_type.label()),
            Cell::new(labels.join(", ")),
        ]);
    }
    print_table(table)
}
