use anyhow::{Result, anyhow};
use serde_json::json;
use spacenote_core::{AppContext, Route};

use crate::cli::{FilterCommands, NoteCommands, SpaceCommands, TemplateCommands, TemplateTarget};
use crate::commands::{filter, note, space, template};
use crate::output::{OutputFormat, json::print_json};

/// Resolve a client route through the auth guard and show the screen it
/// lands on.
pub async fn run(ctx: &AppContext, path: &str, format: OutputFormat) -> Result<()> {
    let requested = Route::parse(path).ok_or_else(|| anyhow!("Unknown route: {path}"))?;
    let landed = ctx.navigate(requested.clone());

    if landed != requested {
        if format.is_json() {
            return print_json(&json!({
                "requested": requested.path(),
                "redirected_to": landed.path(),
            }));
        }
        println!("Redirected from {requested} to {landed}");
        if landed == Route::Login {
            println!("Log in with `spacenote login`.");
        }
        return Ok(());
    }

    match landed {
        Route::Login => {
            println!("Log in with `spacenote login`.");
            Ok(())
        }
        Route::Home | Route::Spaces => {
            space::run(ctx, SpaceCommands::List { refresh: false }, format).await
        }
        Route::SpaceFields { space_id } => {
            let command = SpaceCommands::Show {
                id: space_id,
                fresh: false,
            };
            space::run(ctx, command, format).await
        }
        Route::SpaceTemplates { space_id } => {
            for kind in [TemplateTarget::Detail, TemplateTarget::List] {
                let command = TemplateCommands::Show {
                    space: space_id.clone(),
                    kind,
                };
                template::run(ctx, command, format).await?;
            }
            Ok(())
        }
        Route::SpaceFilters { space_id } => {
            filter::run(ctx, FilterCommands::List { space: space_id }, format).await
        }
        Route::CreateFilter { space_id } => {
            filter::run(ctx, FilterCommands::Operators { space: space_id }, format).await
        }
        route @ Route::Notes { .. } => note::list_notes(ctx, &route, None, None, format).await,
        Route::CreateNote { space_id } => {
            let command = NoteCommands::Form {
                space: space_id,
                note: None,
            };
            note::run(ctx, command, format).await
        }
        Route::NoteDetail { space_id, note_id } => {
            note::show_note(ctx, &space_id, note_id, format).await
        }
        Route::EditNote { space_id, note_id } => {
            let command = NoteCommands::Form {
                space: space_id,
                note: Some(note_id),
            };
            note::run(ctx, command, format).await
        }
    }
}
