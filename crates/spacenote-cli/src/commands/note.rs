use anyhow::{Result, anyhow};
use colored::Colorize;
use comfy_table::Cell;
use serde_json::json;
use spacenote_core::fields::{InputControl, format_datetime};
use spacenote_core::form::{FormMode, NoteForm};
use spacenote_core::pagination::{NotesController, PageControls, PageItem};
use spacenote_core::table::{NoteTable, detail_rows};
use spacenote_core::{AppContext, ClientError, Route};
use spacenote_models::{Note, NotesPage, Space};

use crate::cli::NoteCommands;
use crate::commands::utils::{parse_assignments, require_auth, success};
use crate::output::table::{new_table, print_table};
use crate::output::{OutputFormat, json::print_json};

pub async fn run(ctx: &AppContext, command: NoteCommands, format: OutputFormat) -> Result<()> {
    match command {
        NoteCommands::List {
            space,
            filter,
            page,
            page_size,
        } => {
            let route = Route::Notes {
                space_id: space,
                page,
            };
            list_notes(ctx, &route, filter, page_size, format).await
        }
        NoteCommands::Show { space, id } => show_note(ctx, &space, id, format).await,
        NoteCommands::Create { space, fields } => create_note(ctx, &space, &fields, format).await,
        NoteCommands::Edit { space, id, fields } => {
            edit_note(ctx, &space, id, &fields, format).await
        }
        NoteCommands::Form { space, note } => show_form(ctx, &space, note, format).await,
    }
}

/// Render a notes route: one page of the space's notes, optionally filtered.
pub async fn list_notes(
    ctx: &AppContext,
    route: &Route,
    filter_id: Option<String>,
    page_size: Option<u32>,
    format: OutputFormat,
) -> Result<()> {
    require_auth(ctx, route.clone())?;
    let Route::Notes { space_id, .. } = route else {
        return Err(anyhow!("Not a notes route: {route}"));
    };
    let space = ctx.space(space_id).await?;

    let filter = match filter_id.as_deref() {
        Some(id) => Some(
            space
                .filter(id)
                .cloned()
                .ok_or_else(|| ClientError::NotFound(format!("Filter '{id}' in {space_id}")))?,
        ),
        None => None,
    };

    let page_size = page_size.unwrap_or_else(|| ctx.page_size_for(&space));
    let mut controller = NotesController::from_route(ctx.api.clone(), route)
        .ok_or_else(|| anyhow!("Not a notes route: {route}"))?
        .with_filter(filter_id)
        .with_page_size(Some(page_size));

    let page = controller.refresh().await?.clone();
    let controls = PageControls::from_page(&page);

    if format.is_json() {
        let table = NoteTable::build(&space, filter.as_ref(), &page.notes);
        let rows: Vec<_> = table
            .rows
            .iter()
            .map(|row| {
                json!({
                    "note_id": row.note_id,
                    "cells": row.cells.iter().map(|cell| cell.html()).collect::<Vec<_>>(),
                })
            })
            .collect();
        return print_json(&json!({
            "route": controller.route().path(),
            "columns": table.columns,
            "rows": rows,
            "page": page,
            "controls": controls,
        }));
    }

    if page.notes.is_empty() {
        println!("No notes found.");
    } else if space.note_list_template.is_some() {
        print_templated_list(ctx, &space, &page.notes);
    } else {
        let table = NoteTable::build(&space, filter.as_ref(), &page.notes);
        let mut output = new_table(table.columns.iter().map(String::as_str));
        for row in &table.rows {
            output.add_row(row.cells.iter().map(|cell| Cell::new(cell.plain())));
        }
        print_table(output)?;
    }

    print_page_footer(&page, &controls, &controller.route());
    Ok(())
}

fn print_templated_list(ctx: &AppContext, space: &Space, notes: &[Note]) {
    for note in notes {
        match ctx.templates.render_note_list_item(space, note) {
            Some(rendered) => println!("{rendered}"),
            None => {
                let table = NoteTable::build(space, None, std::slice::from_ref(note));
                if let Some(row) = table.rows.first() {
                    let cells: Vec<String> = row.cells.iter().map(|c| c.plain()).collect();
                    println!("{}", cells.join("  "));
                }
            }
        }
    }
}

fn print_page_footer(page: &NotesPage, controls: &PageControls, route: &Route) {
    if page.total_pages <= 1 {
        println!("{} notes", page.total_count);
        return;
    }

    let items: Vec<String> = controls
        .items
        .iter()
        .map(|item| match item {
            PageItem::Page(n) if *n == page.current_page => format!("[{n}]").bold().to_string(),
            PageItem::Page(n) => n.to_string(),
            PageItem::Ellipsis => "…".to_string(),
        })
        .collect();
    let prev = if controls.prev_enabled { "‹ prev".normal() } else { "‹ prev".dimmed() };
    let next = if controls.next_enabled { "next ›".normal() } else { "next ›".dimmed() };

    println!(
        "{prev}  {}  {next}   page {} of {} ({} notes, {})",
        items.join(" "),
        page.current_page,
        page.total_pages,
        page.total_count,
        route.path()
    );
}

/// Render a note detail route: the space's detail template, or the default
/// field listing when there is none or it fails.
pub async fn show_note(
    ctx: &AppContext,
    space_id: &str,
    note_id: i64,
    format: OutputFormat,
) -> Result<()> {
    require_auth(ctx, Route::note_detail(space_id, note_id))?;
    let space = ctx.space(space_id).await?;
    let note = ctx.api.get_note(space_id, note_id).await?;

    if format.is_json() {
        let rendered = ctx.templates.render_note_detail(&space, &note);
        let fields: serde_json::Map<String, serde_json::Value> = detail_rows(&space, &note)
            .into_iter()
            .map(|(name, cell)| (name, cell.html().into()))
            .collect();
        return print_json(&json!({ "note": note, "fields": fields, "rendered": rendered }));
    }

    if let Some(rendered) = ctx.templates.render_note_detail(&space, &note) {
        println!("{rendered}");
        return Ok(());
    }

    let mut table = new_table(["Field", "Value"]);
    for (name, cell) in detail_rows(&space, &note) {
        table.add_row(vec![Cell::new(name), Cell::new(cell.plain())]);
    }
    print_table(table)?;
    if note.comment_count > 0 {
        let last = note
            .last_comment_at
            .as_deref()
            .and_then(|raw| format_datetime(raw, false))
            .unwrap_or_else(|| "-".to_string());
        println!("{} comment(s), last {last}", note.comment_count);
    }
    Ok(())
}

fn apply_fields(form: &mut NoteForm, assignments: &[String]) -> Result<()> {
    for (name, value) in parse_assignments(assignments)? {
        form.set_value(&name, value)?;
    }
    Ok(())
}

async fn create_note(
    ctx: &AppContext,
    space_id: &str,
    assignments: &[String],
    format: OutputFormat,
) -> Result<()> {
    require_auth(ctx, Route::CreateNote { space_id: space_id.to_string() })?;
    let space = ctx.space(space_id).await?;

    let mut form = NoteForm::create(&space);
    apply_fields(&mut form, assignments)?;
    let payload = form.submit().map_err(ClientError::from)?;
    let note = ctx.api.create_note(space_id, payload).await?;
    let detail = ctx.navigate(Route::note_detail(space_id, note.id));

    if format.is_json() {
        return print_json(&note);
    }

    success(format!("Note created: #{} ({})", note.id, detail.path()));
    Ok(())
}

async fn edit_note(
    ctx: &AppContext,
    space_id: &str,
    note_id: i64,
    assignments: &[String],
    format: OutputFormat,
) -> Result<()> {
    require_auth(
        ctx,
        Route::EditNote {
            space_id: space_id.to_string(),
            note_id,
        },
    )?;
    let space = ctx.space(space_id).await?;
    let current = ctx.api.get_note(space_id, note_id).await?;

    let mut form = NoteForm::edit(&space, &current);
    apply_fields(&mut form, assignments)?;
    let payload = form.submit().map_err(ClientError::from)?;
    let note = ctx.api.update_note(space_id, note_id, payload).await?;

    if format.is_json() {
        return print_json(&note);
    }

    success(format!("Note updated: #{}", note.id));
    Ok(())
}

async fn show_form(
    ctx: &AppContext,
    space_id: &str,
    note_id: Option<i64>,
    format: OutputFormat,
) -> Result<()> {
    let form = match note_id {
        Some(note_id) => {
            require_auth(
                ctx,
                Route::EditNote {
                    space_id: space_id.to_string(),
                    note_id,
                },
            )?;
            let space = ctx.space(space_id).await?;
            let note = ctx.api.get_note(space_id, note_id).await?;
            NoteForm::edit(&space, &note)
        }
        None => {
            require_auth(ctx, Route::CreateNote { space_id: space_id.to_string() })?;
            NoteForm::create(&ctx.space(space_id).await?)
        }
    };

    if format.is_json() {
        let fields: Vec<_> = form
            .fields()
            .iter()
            .map(|field| {
                json!({
                    "name": field.name(),
                    "type": field.field.field_type,
                    "required": field.field.required,
                    "control": describe_control(&field.control),
                    "value": field.value,
                })
            })
            .collect();
        let mode = if form.mode() == FormMode::Edit { "edit" } else { "create" };
        return print_json(&json!({ "mode": mode, "fields": fields }));
    }

    let mut table = new_table(["Field", "Type", "Required", "Input", "Value"]);
    for field in form.fields() {
        table.add_row(vec![
            Cell::new(field.name()),
            Cell::new(field.field.field_type.label()),
            Cell::new(if field.field.required { "Yes" } else { "No" }),
            Cell::new(describe_control(&field.control)),
            Cell::new(&field.value),
        ]);
    }
    print_table(table)
}

fn describe_control(control: &InputControl) -> String {
    match control {
        InputControl::Text { hint: None } => "text".to_string(),
        InputControl::Text { hint: Some(hint) } => format!("text ({hint})"),
        InputControl::Multiline => "multi-line text".to_string(),
        InputControl::Checkbox => "checkbox (true/false)".to_string(),
        InputControl::Select { options } if options.is_empty() => "select".to_string(),
        InputControl::Select { options } => format!("select: {}", options.join(" | ")),
        InputControl::DateTime => "datetime (YYYY-MM-DDTHH:MM)".to_string(),
        InputControl::Number { step, min, max } => {
            let mut text = format!("number, step {}", step.as_str());
            if let Some(min) = min {
                text.push_str(&format!(", min {min}"));
            }
            if let Some(max) = max {
                text.push_str(&format!(", max {max}"));
            }
            text
        }
    }
}
