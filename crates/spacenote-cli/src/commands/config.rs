use anyhow::{Result, anyhow};
use spacenote_core::{AppContext, ClientConfig, paths};

use crate::cli::ConfigCommands;
use crate::commands::utils::success;
use crate::output::{OutputFormat, json::print_json};

pub fn run(ctx: &AppContext, command: ConfigCommands, format: OutputFormat) -> Result<()> {
    match command {
        ConfigCommands::Show => show(&ctx.config, format),
        ConfigCommands::SetApiUrl { url } => {
            let path = paths::config_path()
                .ok_or_else(|| anyhow!("Failed to determine config directory"))?;
            let config = ClientConfig::load_from_path(Some(path.clone())).with_api_url(url);
            config.save_to_path(&path)?;

            if format.is_json() {
                return print_json(&config);
            }
            success(format!("API URL saved to {}", path.display()));
            Ok(())
        }
    }
}

fn show(config: &ClientConfig, format: OutputFormat) -> Result<()> {
    if format.is_json() {
        return print_json(config);
    }

    let data_dir = paths::resolve_data_dir()?;
    println!("API URL:         {}", config.api_url);
    println!("Request timeout: {}s", config.request_timeout_secs);
    println!("Session header:  {}", config.session_header);
    println!(
        "Page size:       {}",
        config
            .default_page_size
            .map(|size| size.to_string())
            .unwrap_or_else(|| "space default".to_string())
    );
    println!("Data directory:  {}", data_dir.display());
    if let Some(path) = paths::config_path() {
        println!("Config file:     {}", path.display());
    }
    Ok(())
}
