//! Client configuration file support
//!
//! Loads configuration from `<config dir>/spacenote/config.toml`, then applies
//! environment overrides.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::paths;

pub const DEFAULT_API_URL: &str = "http://localhost:3000/api";
pub const DEFAULT_SESSION_HEADER: &str = "X-Session-ID";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

const API_URL_ENV: &str = "SPACENOTE_API_URL";

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_session_header() -> String {
    DEFAULT_SESSION_HEADER.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientConfig {
    /// Backend API base URL
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Client-wide request timeout
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Header carrying the session id
    #[serde(default = "default_session_header")]
    pub session_header: String,
    /// Page size requested when listing notes; the space default applies when unset
    #[serde(default)]
    pub default_page_size: Option<u32>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            request_timeout_secs: default_timeout_secs(),
            session_header: default_session_header(),
            default_page_size: None,
        }
    }
}

impl ClientConfig {
    /// Load configuration from the default path plus environment overrides
    pub fn load() -> Self {
        let mut config = Self::load_from_path(paths::config_path());
        config.apply_env();
        config
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: Option<PathBuf>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "Ignoring unparsable config");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn save_to_path(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(API_URL_ENV)
            && !url.trim().is_empty()
        {
            self.api_url = url;
        }
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}
