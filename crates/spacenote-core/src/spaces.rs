//! Cached list of spaces visible to the current user.
//!
//! The cache loads lazily: `load_spaces` fetches only when nothing is cached
//! and no fetch is running, so concurrent callers cause at most one request.
//! `refresh_spaces` always refetches. Mutating views refresh after a
//! successful write instead of patching the list locally.

use parking_lot::Mutex;
use spacenote_models::Space;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::api::SpaceSource;
use crate::error::Result;

#[derive(Debug, Default)]
struct CacheState {
    spaces: Vec<Space>,
    loading: bool,
    error: Option<String>,
}

pub struct SpacesStore {
    source: Arc<dyn SpaceSource>,
    state: Mutex<CacheState>,
    path: Option<PathBuf>,
}

impl SpacesStore {
    pub fn new(source: Arc<dyn SpaceSource>) -> Self {
        Self {
            source,
            state: Mutex::new(CacheState::default()),
            path: None,
        }
    }

    /// Cache persisted to a JSON file, seeded from it when present.
    pub fn persistent(source: Arc<dyn SpaceSource>, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let spaces = read_cache(&path);
        Self {
            source,
            state: Mutex::new(CacheState {
                spaces,
                ..CacheState::default()
            }),
            path: Some(path),
        }
    }

    /// Fetch the list unless it is cached or a fetch is already in flight.
    pub async fn load_spaces(&self) -> Result<()> {
        {
            let mut state = self.state.lock();
            if state.loading || !state.spaces.is_empty() {
                debug!(loading = state.loading, "Space list already available");
                return Ok(());
            }
            state.loading = true;
        }
        self.fetch().await
    }

    /// Refetch unconditionally, replacing the cached list on success.
    pub async fn refresh_spaces(&self) -> Result<()> {
        self.state.lock().loading = true;
        self.fetch().await
    }

    async fn fetch(&self) -> Result<()> {
        let result = self.source.fetch_spaces().await;
        let mut state = self.state.lock();
        state.loading = false;

        match result {
            Ok(spaces) => {
                debug!(count = spaces.len(), "Space list loaded");
                state.spaces = spaces;
                state.error = None;
                let snapshot = state.spaces.clone();
                drop(state);
                self.persist(&snapshot);
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Failed to load spaces");
                state.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    pub fn spaces(&self) -> Vec<Space> {
        self.state.lock().spaces.clone()
    }

    pub fn get_space(&self, space_id: &str) -> Option<Space> {
        self.state
            .lock()
            .spaces
            .iter()
            .find(|space| space.id == space_id)
            .cloned()
    }

    pub fn is_loading(&self) -> bool {
        self.state.lock().loading
    }

    /// Message from the most recent failed fetch, cleared by a successful one.
    pub fn error(&self) -> Option<String> {
        self.state.lock().error.clone()
    }

    /// Drop the cached list, e.g. after logout.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.spaces.clear();
        state.error = None;
        drop(state);
        self.persist(&[]);
    }

    fn persist(&self, spaces: &[Space]) {
        let Some(path) = &self.path else {
            return;
        };
        if let Err(e) = write_cache(path, spaces) {
            warn!(path = %path.display(), error = %e, "Failed to persist space cache");
        }
    }
}

fn read_cache(path: &Path) -> Vec<Space> {
    let Ok(raw) = std::fs::read_to_string(path) else {
        return Vec::new();
    };
    match serde_json::from_str(&raw) {
        Ok(spaces) => spaces,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Ignoring corrupt space cache");
            Vec::new()
        }
    }
}

fn write_cache(path: &Path, spaces: &[Space]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_vec_pretty(spaces)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct CountingSource {
        calls: AtomicUsize,
        fail: bool,
    }

    impl CountingSource {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                fail,
            })
        }
    }

    #[async_trait]
    impl SpaceSource for CountingSource {
        async fn fetch_spaces(&self) -> Result<Vec<Space>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            if self.fail {
                return Err(ClientError::Network("connection refused".into()));
            }
            Ok(vec![Space::new("work", "Work"), Space::new("home", "Home")])
        }
    }

    #[tokio::test]
    async fn test_concurrent_loads_fetch_once() {
        let source = CountingSource::new(false);
        let store = SpacesStore::new(source.clone());

        let (a, b) = tokio::join!(store.load_spaces(), store.load_spaces());
        a.unwrap();
        b.unwrap();

        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.spaces().len(), 2);
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn test_load_is_noop_when_cached_but_refresh_refetches() {
        let source = CountingSource::new(false);
        let store = SpacesStore::new(source.clone());

        store.load_spaces().await.unwrap();
        store.load_spaces().await.unwrap();
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);

        store.refresh_spaces().await.unwrap();
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
        assert_eq!(store.get_space("home").unwrap().name, "Home");
        assert!(store.get_space("missing").is_none());
    }

    #[tokio::test]
    async fn test_failed_load_records_error() {
        let store = SpacesStore::new(CountingSource::new(true));

        assert!(store.load_spaces().await.is_err());
        assert!(store.error().unwrap().contains("connection refused"));
        assert!(store.spaces().is_empty());
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn test_persistent_cache_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spaces.json");

        let first = SpacesStore::persistent(CountingSource::new(false), &path);
        first.load_spaces().await.unwrap();

        let source = CountingSource::new(false);
        let second = SpacesStore::persistent(source.clone(), &path);
        assert_eq!(second.spaces().len(), 2);
        second.load_spaces().await.unwrap();
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }
}
