pub mod auth;
pub mod comment;
pub mod config;
pub mod filter;
pub mod note;
pub mod open;
pub mod space;
pub mod template;
pub mod user;
pub mod utils;

use anyhow::Result;
use spacenote_core::AppContext;
use std::sync::Arc;

use crate::cli::Commands;
use crate::output::OutputFormat;

pub async fn dispatch(ctx: Arc<AppContext>, command: Commands, format: OutputFormat) -> Result<()> {
    match command {
        Commands::Login(args) => auth::login(&ctx, args, format).await,
        Commands::Logout => auth::logout(&ctx, format).await,
        Commands::Whoami => auth::whoami(&ctx, format).await,
        Commands::Passwd => auth::change_password(&ctx, format).await,
        Commands::Open { path } => open::run(&ctx, &path, format).await,
        Commands::Space { command } => space::run(&ctx, command, format).await,
        Commands::Filter { command } => filter::run(&ctx, command, format).await,
        Commands::Template { command } => template::run(&ctx, command, format).await,
        Commands::Note { command } => note::run(&ctx, command, format).await,
        Commands::Comment { command } => comment::run(&ctx, command, format).await,
        Commands::User { command } => user::run(&ctx, command, format).await,
        Commands::Config { command } => config::run(&ctx, command, format),
        // Handled before the context is built
        Commands::Completions { .. } => Ok(()),
    }
}
