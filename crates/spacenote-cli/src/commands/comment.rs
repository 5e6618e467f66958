use anyhow::{Result, bail};
use comfy_table::Cell;
use spacenote_core::fields::format_datetime;
use spacenote_core::{AppContext, Route};

use crate::cli::CommentCommands;
use crate::commands::utils::{require_auth, success};
use crate::output::table::{new_table, print_table};
use crate::output::{OutputFormat, json::print_json};

pub async fn run(ctx: &AppContext, command: CommentCommands, format: OutputFormat) -> Result<()> {
    match command {
        CommentCommands::List { space, note } => {
            require_auth(ctx, Route::note_detail(space.clone(), note))?;
            let comments = ctx.api.list_comments(&space, note).await?;

            if format.is_json() {
                return print_json(&comments);
            }

            if comments.is_empty() {
                println!("No comments yet.");
                return Ok(());
            }

            let mut table = new_table(["ID", "Author", "Posted", "Reply to", "Comment"]);
            for comment in comments {
                let posted = format_datetime(&comment.created_at, false)
                    .unwrap_or_else(|| comment.created_at.clone());
                let posted = match &comment.edited_at {
                    Some(_) => format!("{posted} (edited)"),
                    None => posted,
                };
                table.add_row(vec![
                    Cell::new(comment.id),
                    Cell::new(&comment.author),
                    Cell::new(posted),
                    Cell::new(
                        comment
                            .parent_id
                            .map(|id| format!("#{id}"))
                            .unwrap_or_else(|| "-".to_string()),
                    ),
                    Cell::new(&comment.content),
                ]);
            }
            print_table(table)
        }
        CommentCommands::Add {
            space,
            note,
            content,
        } => {
            require_auth(ctx, Route::note_detail(space.clone(), note))?;
            if content.trim().is_empty() {
                bail!("Comment cannot be empty");
            }
            let comment = ctx.api.create_comment(&space, note, content.trim()).await?;

            if format.is_json() {
                return print_json(&comment);
            }

            success(format!("Comment #{} added to note #{note}", comment.id));
            Ok(())
        }
    }
}
