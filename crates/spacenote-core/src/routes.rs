//! Client routes, the auth guard and the navigator.
//!
//! Every screen of the client is a [`Route`]. Paths use the same shape as the
//! browser client (`/notes/{space}/{note}`), and the notes list carries its
//! page in the query string, omitted on page 1.

use parking_lot::Mutex;
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Login,
    Home,
    Spaces,
    SpaceFields { space_id: String },
    SpaceTemplates { space_id: String },
    SpaceFilters { space_id: String },
    CreateFilter { space_id: String },
    Notes { space_id: String, page: u32 },
    CreateNote { space_id: String },
    NoteDetail { space_id: String, note_id: i64 },
    EditNote { space_id: String, note_id: i64 },
}

impl Route {
    pub fn notes(space_id: impl Into<String>) -> Self {
        Route::Notes {
            space_id: space_id.into(),
            page: 1,
        }
    }

    pub fn note_detail(space_id: impl Into<String>, note_id: i64) -> Self {
        Route::NoteDetail {
            space_id: space_id.into(),
            note_id,
        }
    }

    /// Routes reachable without a session.
    pub fn is_public(&self) -> bool {
        matches!(self, Route::Login)
    }

    pub fn path(&self) -> String {
        match self {
            Route::Login => "/login".to_string(),
            Route::Home => "/".to_string(),
            Route::Spaces => "/spaces".to_string(),
            Route::SpaceFields { space_id } => format!("/spaces/{space_id}/fields"),
            Route::SpaceTemplates { space_id } => format!("/spaces/{space_id}/templates"),
            Route::SpaceFilters { space_id } => format!("/spaces/{space_id}/filters"),
            Route::CreateFilter { space_id } => format!("/spaces/{space_id}/filters/create"),
            Route::Notes { space_id, page } if *page > 1 => {
                format!("/notes/{space_id}?page={page}")
            }
            Route::Notes { space_id, .. } => format!("/notes/{space_id}"),
            Route::CreateNote { space_id } => format!("/notes/{space_id}/new"),
            Route::NoteDetail { space_id, note_id } => format!("/notes/{space_id}/{note_id}"),
            Route::EditNote { space_id, note_id } => format!("/notes/{space_id}/{note_id}/edit"),
        }
    }

    /// Parse a client path. Unknown paths yield `None`.
    pub fn parse(input: &str) -> Option<Route> {
        let (path, query) = match input.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (input, None),
        };
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        let route = match segments.as_slice() {
            [] => Route::Home,
            ["login"] => Route::Login,
            ["spaces"] => Route::Spaces,
            ["spaces", id, "fields"] => Route::SpaceFields {
                space_id: id.to_string(),
            },
            ["spaces", id, "templates"] => Route::SpaceTemplates {
                space_id: id.to_string(),
            },
            ["spaces", id, "filters"] => Route::SpaceFilters {
                space_id: id.to_string(),
            },
            ["spaces", id, "filters", "create"] => Route::CreateFilter {
                space_id: id.to_string(),
            },
            ["notes", id] => Route::Notes {
                space_id: id.to_string(),
                page: query.and_then(page_from_query).unwrap_or(1),
            },
            ["notes", id, "new"] => Route::CreateNote {
                space_id: id.to_string(),
            },
            ["notes", id, note] => Route::NoteDetail {
                space_id: id.to_string(),
                note_id: note.parse().ok()?,
            },
            ["notes", id, note, "edit"] => Route::EditNote {
                space_id: id.to_string(),
                note_id: note.parse().ok()?,
            },
            _ => return None,
        };
        Some(route)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

fn page_from_query(query: &str) -> Option<u32> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == "page")
        .and_then(|(_, value)| value.parse().ok())
        .filter(|page| *page >= 1)
}

/// Where a navigation request actually lands given the auth state.
///
/// Unauthenticated users are sent to `/login`; authenticated users asking for
/// `/login` are sent home.
pub fn guard(route: Route, authenticated: bool) -> Route {
    match (authenticated, route.is_public()) {
        (false, false) => Route::Login,
        (true, true) => Route::Home,
        _ => route,
    }
}

/// Current location plus history.
#[derive(Debug)]
pub struct Navigator {
    state: Mutex<NavigatorState>,
}

#[derive(Debug)]
struct NavigatorState {
    current: Route,
    history: Vec<Route>,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(Route::Home)
    }
}

impl Navigator {
    pub fn new(start: Route) -> Self {
        Self {
            state: Mutex::new(NavigatorState {
                current: start,
                history: Vec::new(),
            }),
        }
    }

    pub fn current(&self) -> Route {
        self.state.lock().current.clone()
    }

    /// Navigate through the auth guard and return where we ended up.
    pub fn navigate(&self, route: Route, authenticated: bool) -> Route {
        let target = guard(route, authenticated);
        self.go(target.clone());
        target
    }

    /// Hard redirect to the login screen, bypassing the guard.
    pub fn redirect_to_login(&self) {
        self.go(Route::Login);
    }

    pub fn history(&self) -> Vec<Route> {
        self.state.lock().history.clone()
    }

    fn go(&self, route: Route) {
        let mut state = self.state.lock();
        debug!(from = %state.current, to = %route, "Navigate");
        let previous = std::mem::replace(&mut state.current, route);
        state.history.push(previous);
    }
}
