//! Filter selection and page state for a space's note list.
//!
//! Every change refetches the whole page from the backend. Responses are not
//! checked for staleness: if two fetches overlap, whichever resolves last
//! wins.

use serde::Serialize;
use spacenote_models::NotesPage;
use std::sync::Arc;
use tracing::{debug, error};

use crate::api::{NoteSource, NotesQuery};
use crate::error::Result;
use crate::routes::Route;

/// Page buttons shown before the list collapses into ellipses.
pub const MAX_VISIBLE_PAGES: u32 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PageItem {
    Page(u32),
    Ellipsis,
}

/// Page buttons for `current` of `total`: first page, up to three pages
/// around the current one, last page, with ellipses over the gaps.
pub fn page_items(current: u32, total: u32) -> Vec<PageItem> {
    if total <= MAX_VISIBLE_PAGES {
        return (1..=total).map(PageItem::Page).collect();
    }

    let current = current.clamp(1, total);
    let start = current.saturating_sub(1).max(2);
    let end = (current + 1).min(total - 1);

    let mut items = vec![PageItem::Page(1)];
    if start > 2 {
        items.push(PageItem::Ellipsis);
    }
    items.extend((start..=end).map(PageItem::Page));
    if end < total - 1 {
        items.push(PageItem::Ellipsis);
    }
    items.push(PageItem::Page(total));
    items
}

/// State of the previous/next buttons and the page list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageControls {
    pub prev_enabled: bool,
    pub next_enabled: bool,
    pub items: Vec<PageItem>,
}

impl PageControls {
    /// Enabled states come straight from the backend's flags.
    pub fn from_page(page: &NotesPage) -> Self {
        Self {
            prev_enabled: page.has_prev,
            next_enabled: page.has_next,
            items: page_items(page.current_page, page.total_pages),
        }
    }
}

pub struct NotesController {
    source: Arc<dyn NoteSource>,
    space_id: String,
    selected_filter: Option<String>,
    current_page: u32,
    page_size: Option<u32>,
    page: Option<NotesPage>,
    error: Option<String>,
}

impl NotesController {
    pub fn new(source: Arc<dyn NoteSource>, space_id: impl Into<String>) -> Self {
        Self {
            source,
            space_id: space_id.into(),
            selected_filter: None,
            current_page: 1,
            page_size: None,
            page: None,
            error: None,
        }
    }

    /// Controller positioned at the page a notes route points to.
    pub fn from_route(source: Arc<dyn NoteSource>, route: &Route) -> Option<Self> {
        match route {
            Route::Notes { space_id, page } => {
                let mut controller = Self::new(source, space_id.clone());
                controller.current_page = (*page).max(1);
                Some(controller)
            }
            _ => None,
        }
    }

    pub fn with_page_size(mut self, page_size: Option<u32>) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_filter(mut self, filter_id: Option<String>) -> Self {
        self.selected_filter = filter_id;
        self
    }

    pub fn space_id(&self) -> &str {
        &self.space_id
    }

    pub fn selected_filter(&self) -> Option<&str> {
        self.selected_filter.as_deref()
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    /// Last page received, if any.
    pub fn page(&self) -> Option<&NotesPage> {
        self.page.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// The notes route reflecting the current page.
    pub fn route(&self) -> Route {
        Route::Notes {
            space_id: self.space_id.clone(),
            page: self.current_page,
        }
    }

    pub fn controls(&self) -> Option<PageControls> {
        self.page.as_ref().map(PageControls::from_page)
    }

    /// Select a filter (or none). Always goes back to page 1.
    pub async fn select_filter(&mut self, filter_id: Option<String>) -> Result<&NotesPage> {
        self.selected_filter = filter_id;
        self.current_page = 1;
        self.refresh().await
    }

    /// Move to another page, keeping the selected filter.
    pub async fn set_page(&mut self, page: u32) -> Result<&NotesPage> {
        self.current_page = page.max(1);
        self.refresh().await
    }

    /// Fetch the page for the current parameters.
    pub async fn refresh(&mut self) -> Result<&NotesPage> {
        let query = NotesQuery {
            filter_id: self.selected_filter.clone(),
            page: Some(self.current_page),
            page_size: self.page_size,
        };
        debug!(
            space_id = %self.space_id,
            filter_id = ?query.filter_id,
            page = self.current_page,
            "Fetching notes"
        );

        match self.source.fetch_notes(&self.space_id, &query).await {
            Ok(page) => {
                self.error = None;
                Ok(&*self.page.insert(page))
            }
            Err(e) => {
                error!(space_id = %self.space_id, error = %e, "Failed to load notes");
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }
}
