use anyhow::{Result, bail};
use comfy_table::Cell;
use serde_json::json;
use spacenote_core::admin::MIN_PASSWORD_LENGTH;
use spacenote_core::{AppContext, Route};

use crate::cli::UserCommands;
use crate::commands::utils::{prompt_secret, require_auth, success};
use crate::output::table::{new_table, print_table};
use crate::output::{OutputFormat, json::print_json};

pub async fn run(ctx: &AppContext, command: UserCommands, format: OutputFormat) -> Result<()> {
    require_auth(ctx, Route::Home)?;

    match command {
        UserCommands::List => {
            let users = ctx.api.list_users().await?;

            if format.is_json() {
                return print_json(&users);
            }

            let mut table = new_table(["Username"]);
            for user in users {
                table.add_row(vec![Cell::new(user.id)]);
            }
            print_table(table)
        }
        UserCommands::Create { username } => {
            let username = username.trim();
            if username.is_empty() {
                bail!("Username is required");
            }
            let password = prompt_secret(&format!("Password for {username}: "))?;
            if password.chars().count() < MIN_PASSWORD_LENGTH {
                bail!("Password must be at least {MIN_PASSWORD_LENGTH} characters");
            }

            let user = ctx.api.create_user(username, &password).await?;

            if format.is_json() {
                return print_json(&json!({ "created": true, "user": user }));
            }

            success(format!("User created: {}", user.id));
            Ok(())
        }
    }
}
