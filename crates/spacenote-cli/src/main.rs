mod cli;
mod commands;
mod completions;
mod error;
mod output;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use spacenote_core::{AppContext, ClientConfig, paths};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        error::handle_error(err);
    }
}

async fn run(cli: Cli) -> Result<()> {
    // Logs go to a file so they never mix with command output
    let log_dir = paths::logs_dir()?;
    let file_appender = tracing_appender::rolling::daily(log_dir, "spacenote.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_ansi(false)
        .with_target(false)
        .with_level(true)
        .init();

    let Some(command) = cli.command else {
        println!("Run `spacenote --help` to see available commands.");
        return Ok(());
    };

    if let Commands::Completions { shell } = command {
        completions::generate_completions(shell);
        return Ok(());
    }

    let mut config = ClientConfig::load();
    if let Some(api_url) = cli.api_url {
        config = config.with_api_url(api_url);
    }

    tracing::debug!(api_url = %config.api_url, "Running command");
    let ctx = Arc::new(AppContext::new(config)?);
    commands::dispatch(ctx, command, cli.format).await
}
