use anyhow::Result;
use colored::Colorize;
use serde_json::json;
use spacenote_core::{AppContext, Route};

use crate::cli::LoginArgs;
use crate::commands::utils::{prompt_line, prompt_secret, require_auth, success};
use crate::output::{OutputFormat, json::print_json};

pub async fn login(ctx: &AppContext, args: LoginArgs, format: OutputFormat) -> Result<()> {
    let username = match args.username {
        Some(username) => username,
        None => prompt_line("Username: ")?,
    };
    let password = match args.password {
        Some(password) => password,
        None => prompt_secret("Password: ")?,
    };

    let session = ctx.login(username.trim(), &password).await?;

    if format.is_json() {
        return print_json(&json!({ "user_id": session.user_id, "authenticated": true }));
    }

    success(format!("Logged in as {}", session.user_id));
    Ok(())
}

pub async fn logout(ctx: &AppContext, format: OutputFormat) -> Result<()> {
    let was_authenticated = ctx.is_authenticated();
    let confirmed = ctx.logout().await;

    if format.is_json() {
        return print_json(&json!({
            "logged_out": was_authenticated,
            "server_confirmed": confirmed,
        }));
    }

    if was_authenticated {
        success("Logged out");
        if !confirmed {
            println!(
                "{}",
                "The server did not confirm the logout; the local session was cleared.".dimmed()
            );
        }
    } else {
        println!("Not logged in.");
    }
    Ok(())
}

pub async fn whoami(ctx: &AppContext, format: OutputFormat) -> Result<()> {
    require_auth(ctx, Route::Home)?;
    let user = ctx.api.me().await?;

    if format.is_json() {
        return print_json(&json!({ "user": user }));
    }

    match user {
        Some(user) => println!("{}", user.id),
        None => println!("Not logged in."),
    }
    Ok(())
}

pub async fn change_password(ctx: &AppContext, format: OutputFormat) -> Result<()> {
    require_auth(ctx, Route::Home)?;

    let current = prompt_secret("Current password: ")?;
    let new = prompt_secret("New password: ")?;
    let confirm = prompt_secret("Confirm new password: ")?;
    ctx.change_password(&current, &new, Some(&confirm)).await?;

    if format.is_json() {
        return print_json(&json!({ "changed": true, "logged_out": true }));
    }

    success("Password changed. Please log in again.");
    Ok(())
}
