use anyhow::{Context, Result, anyhow};
use comfy_table::Cell;
use serde_json::json;
use spacenote_core::fields::{format_default, format_options};
use spacenote_core::{AppContext, Route};
use spacenote_models::{ExportData, Space};

use crate::cli::SpaceCommands;
use crate::commands::utils::{require_auth, success};
use crate::output::table::{new_table, print_table};
use crate::output::{OutputFormat, json::print_json};

pub async fn run(ctx: &AppContext, command: SpaceCommands, format: OutputFormat) -> Result<()> {
    match command {
        SpaceCommands::List { refresh } => list_spaces(ctx, refresh, format).await,
        SpaceCommands::Show { id, fresh } => show_space(ctx, &id, fresh, format).await,
        SpaceCommands::Create { id, name } => create_space(ctx, &id, &name, format).await,
        SpaceCommands::ListFields { id, fields } => {
            require_auth(ctx, Route::SpaceFields { space_id: id.clone() })?;
            let names = ctx.set_list_fields(&id, &fields).await?;
            report_fields(&id, "List fields", &names, format)
        }
        SpaceCommands::HiddenFields { id, fields } => {
            require_auth(ctx, Route::SpaceFields { space_id: id.clone() })?;
            let names = ctx.set_hidden_create_fields(&id, &fields).await?;
            report_fields(&id, "Hidden create fields", &names, format)
        }
        SpaceCommands::Export {
            id,
            include_content,
            output,
        } => export_space(ctx, &id, include_content, output.as_deref(), format).await,
        SpaceCommands::Import { file } => import_space(ctx, &file, format).await,
    }
}

async fn list_spaces(ctx: &AppContext, refresh: bool, format: OutputFormat) -> Result<()> {
    require_auth(ctx, Route::Spaces)?;
    if refresh {
        ctx.spaces.refresh_spaces().await?;
    } else {
        ctx.spaces.load_spaces().await?;
    }
    let spaces = ctx.spaces.spaces();

    if format.is_json() {
        return print_json(&spaces);
    }

    if spaces.is_empty() {
        println!("No spaces yet. Create one with `spacenote space create <id> <name>`.");
        return Ok(());
    }

    let mut table = new_table(["ID", "Name", "Members", "Fields", "Filters"]);
    for space in spaces {
        table.add_row(vec![
            Cell::new(&space.id),
            Cell::new(&space.name),
            Cell::new(space.members.join(", ")),
            Cell::new(space.fields.len()),
            Cell::new(space.filters.len()),
        ]);
    }
    print_table(table)
}

async fn show_space(ctx: &AppContext, id: &str, fresh: bool, format: OutputFormat) -> Result<()> {
    require_auth(ctx, Route::SpaceFields { space_id: id.to_string() })?;
    let space = if fresh {
        ctx.api.get_space(id).await?
    } else {
        ctx.space(id).await?
    };

    if format.is_json() {
        return print_json(&space);
    }

    print_space_summary(&space);

    let mut table = new_table(["Field", "Type", "Required", "Options", "Default"]);
    for field in &space.fields {
        table.add_row(vec![
            Cell::new(&field.name),
            Cell::new(field.field_type.label()),
            Cell::new(if field.required { "Yes" } else { "No" }),
            Cell::new(format_options(&field.options)),
            Cell::new(format_default(field)),
        ]);
    }
    print_table(table)
}

fn print_space_summary(space: &Space) {
    let or_dash = |names: &[String]| {
        if names.is_empty() {
            "-".to_string()
        } else {
            names.join(", ")
        }
    };
    println!("ID:            {}", space.id);
    println!("Name:          {}", space.name);
    println!("Members:       {}", or_dash(&space.members));
    println!("List fields:   {}", or_dash(&space.list_fields));
    println!("Hidden fields: {}", or_dash(&space.hidden_create_fields));
    println!(
        "Page size:     {} (max {})",
        space.default_page_size, space.max_page_size
    );
    println!(
        "Templates:     detail {}, list {}",
        if space.note_detail_template.is_some() { "set" } else { "-" },
        if space.note_list_template.is_some() { "set" } else { "-" },
    );
    println!();
}

async fn create_space(ctx: &AppContext, id: &str, name: &str, format: OutputFormat) -> Result<()> {
    require_auth(ctx, Route::Spaces)?;
    ctx.create_space(id, name).await?;

    if format.is_json() {
        return print_json(&json!({ "created": true, "id": id }));
    }

    success(format!("Space created: {id}"));
    Ok(())
}

fn report_fields(id: &str, label: &str, names: &[String], format: OutputFormat) -> Result<()> {
    if format.is_json() {
        return print_json(&json!({ "space_id": id, "field_names": names }));
    }

    if names.is_empty() {
        success(format!("{label} of {id} reset"));
    } else {
        success(format!("{label} of {id}: {}", names.join(", ")));
    }
    Ok(())
}

async fn export_space(
    ctx: &AppContext,
    id: &str,
    include_content: bool,
    output: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    require_auth(ctx, Route::Spaces)?;
    let data = ctx.export_space(id, include_content).await?;
    let encoded = serde_json::to_string_pretty(&data)?;

    let Some(path) = output else {
        println!("{encoded}");
        return Ok(());
    };

    std::fs::write(path, encoded).with_context(|| format!("Failed to write {path}"))?;
    if format.is_json() {
        return print_json(&json!({ "space_id": id, "path": path }));
    }
    success(format!("Exported {id} to {path}"));
    Ok(())
}

async fn import_space(ctx: &AppContext, file: &str, format: OutputFormat) -> Result<()> {
    require_auth(ctx, Route::Spaces)?;
    let raw = std::fs::read_to_string(file).with_context(|| format!("Failed to read {file}"))?;
    let value: serde_json::Value = serde_json::from_str(&raw)?;
    if !value.get("space").is_some_and(serde_json::Value::is_object) {
        return Err(anyhow!("Invalid export file: missing 'space' object"));
    }
    let data: ExportData = serde_json::from_value(value)?;

    let result = ctx.import_space(&data).await?;

    if format.is_json() {
        return print_json(&result);
    }

    success(format!("Imported space {}", result.space_id));
    println!("  Notes imported:    {}", result.notes_imported);
    println!("  Comments imported: {}", result.comments_imported);
    for warning in &result.warnings {
        println!("  warning: {warning}");
    }
    Ok(())
}
