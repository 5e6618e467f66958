use anyhow::Result;
use std::path::PathBuf;

const SPACENOTE_DIR: &str = ".spacenote";
const SESSION_FILE: &str = "session.json";
const SPACES_CACHE_FILE: &str = "spaces.json";
const LOGS_DIR: &str = "logs";
const CONFIG_DIR: &str = "spacenote";
const CONFIG_FILE: &str = "config.toml";

/// Environment variable to override the SpaceNote data directory.
const SPACENOTE_DIR_ENV: &str = "SPACENOTE_DIR";

/// Resolve the SpaceNote data directory.
/// Priority: SPACENOTE_DIR env var > ~/.spacenote/
pub fn resolve_data_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(SPACENOTE_DIR_ENV)
        && !dir.trim().is_empty()
    {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|h| h.join(SPACENOTE_DIR))
        .ok_or_else(|| anyhow::anyhow!("Failed to determine home directory"))
}

/// Ensure the data directory exists and return its path.
pub fn ensure_data_dir() -> Result<PathBuf> {
    let dir = resolve_data_dir()?;
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Persisted session: ~/.spacenote/session.json
pub fn session_path() -> Result<PathBuf> {
    Ok(resolve_data_dir()?.join(SESSION_FILE))
}

/// Persisted space list: ~/.spacenote/spaces.json
pub fn spaces_cache_path() -> Result<PathBuf> {
    Ok(resolve_data_dir()?.join(SPACES_CACHE_FILE))
}

/// Get the logs directory: ~/.spacenote/logs/
pub fn logs_dir() -> Result<PathBuf> {
    let dir = resolve_data_dir()?.join(LOGS_DIR);
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Client configuration file: <config dir>/spacenote/config.toml
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join(CONFIG_DIR).join(CONFIG_FILE))
}
