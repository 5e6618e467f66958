//! Authenticated session state.
//!
//! Holds the session id and user id issued at login. When a persistence path
//! is configured the session survives process restarts, the way the browser
//! client kept it in local storage.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    pub session_id: String,
    pub user_id: String,
}

#[derive(Debug, Default)]
pub struct SessionStore {
    current: RwLock<Option<Session>>,
    path: Option<PathBuf>,
}

impl SessionStore {
    /// In-memory store, nothing persisted.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Store backed by a JSON file. A missing or corrupt file means logged out.
    pub fn persistent(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let current = load_session(&path);
        Self {
            current: RwLock::new(current),
            path: Some(path),
        }
    }

    pub fn login(&self, session_id: impl Into<String>, user_id: impl Into<String>) {
        let session = Session {
            session_id: session_id.into(),
            user_id: user_id.into(),
        };
        info!(user_id = %session.user_id, "Session started");
        self.persist(Some(&session));
        *self.current.write() = Some(session);
    }

    pub fn logout(&self) {
        let previous = self.current.write().take();
        if let Some(session) = previous {
            info!(user_id = %session.user_id, "Session cleared");
        }
        self.persist(None);
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.read().is_some()
    }

    pub fn session_id(&self) -> Option<String> {
        self.current
            .read()
            .as_ref()
            .map(|session| session.session_id.clone())
    }

    pub fn user_id(&self) -> Option<String> {
        self.current
            .read()
            .as_ref()
            .map(|session| session.user_id.clone())
    }

    pub fn current(&self) -> Option<Session> {
        self.current.read().clone()
    }

    fn persist(&self, session: Option<&Session>) {
        let Some(path) = &self.path else {
            return;
        };

        let result = match session {
            Some(session) => write_session(path, session),
            None => match std::fs::remove_file(path) {
                Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
                _ => Ok(()),
            },
        };

        if let Err(e) = result {
            warn!(path = %path.display(), error = %e, "Failed to persist session");
        }
    }
}

fn load_session(path: &Path) -> Option<Session> {
    let content = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str(&content) {
        Ok(session) => Some(session),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Ignoring corrupt session file");
            None
        }
    }
}

fn write_session(path: &Path, session: &Session) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_vec_pretty(session)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_login_and_logout() {
        let store = SessionStore::in_memory();
        assert!(!store.is_authenticated());

        store.login("sess-1", "alice");
        assert!(store.is_authenticated());
        assert_eq!(store.session_id().as_deref(), Some("sess-1"));
        assert_eq!(store.user_id().as_deref(), Some("alice"));

        store.logout();
        assert!(!store.is_authenticated());
        assert_eq!(store.session_id(), None);
    }

    #[test]
    fn test_session_survives_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");

        SessionStore::persistent(&path).login("sess-2", "bob");
        let reloaded = SessionStore::persistent(&path);
        assert_eq!(reloaded.user_id().as_deref(), Some("bob"));

        reloaded.logout();
        assert!(!path.exists());
        assert!(!SessionStore::persistent(&path).is_authenticated());
    }

    #[test]
    fn test_corrupt_file_means_logged_out() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(!SessionStore::persistent(&path).is_authenticated());
    }
}
