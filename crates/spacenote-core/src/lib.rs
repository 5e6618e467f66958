pub mod admin;
pub mod api;
pub mod config;
pub mod error;
pub mod fields;
pub mod form;
pub mod markdown;
pub mod pagination;
pub mod paths;
pub mod routes;
pub mod session;
pub mod spaces;
pub mod table;
pub mod template;
pub mod validation;

pub use api::{ApiClient, NotesQuery, TemplateKind};
pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use routes::{Navigator, Route};
pub use session::{Session, SessionStore};
pub use spaces::SpacesStore;
pub use template::TemplateRenderer;

use spacenote_models::{ExportData, Filter, ImportResult, Space};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use admin::FilterDraft;
use pagination::NotesController;

/// Client state shared by every command: session, navigation, the HTTP
/// client and the space cache. Created once at startup.
pub struct AppContext {
    pub config: ClientConfig,
    pub session: Arc<SessionStore>,
    pub navigator: Arc<Navigator>,
    pub api: Arc<ApiClient>,
    pub spaces: SpacesStore,
    pub templates: TemplateRenderer,
}

impl AppContext {
    /// Context persisted under the data directory.
    pub fn new(config: ClientConfig) -> anyhow::Result<Self> {
        paths::ensure_data_dir()?;
        let session = Arc::new(SessionStore::persistent(paths::session_path()?));
        let context = Self::assemble(config, session, Some(paths::spaces_cache_path()?))?;
        info!(api_url = %context.config.api_url, "SpaceNote client initialized");
        Ok(context)
    }

    /// Context that keeps everything in memory.
    pub fn in_memory(config: ClientConfig) -> Result<Self> {
        Self::assemble(config, Arc::new(SessionStore::in_memory()), None)
    }

    fn assemble(
        config: ClientConfig,
        session: Arc<SessionStore>,
        spaces_path: Option<PathBuf>,
    ) -> Result<Self> {
        let navigator = Arc::new(Navigator::default());
        let api = Arc::new(ApiClient::new(&config, session.clone(), navigator.clone())?);
        let spaces = match spaces_path {
            Some(path) => SpacesStore::persistent(api.clone(), path),
            None => SpacesStore::new(api.clone()),
        };
        Ok(Self {
            config,
            session,
            navigator,
            api,
            spaces,
            templates: TemplateRenderer::new()?,
        })
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// Navigate through the auth guard; returns where we actually landed.
    pub fn navigate(&self, route: Route) -> Route {
        self.navigator.navigate(route, self.is_authenticated())
    }

    // ── Session ──────────────────────────────────────────────────────

    pub async fn login(&self, username: &str, password: &str) -> Result<Session> {
        let session = self.api.login(username, password).await?;
        self.navigate(Route::Home);
        Ok(session)
    }

    /// Log out locally; `true` when the backend also confirmed it.
    pub async fn logout(&self) -> bool {
        let confirmed = self.api.logout().await;
        self.spaces.clear();
        self.navigator.redirect_to_login();
        confirmed
    }

    pub async fn change_password(
        &self,
        current: &str,
        new: &str,
        confirm: Option<&str>,
    ) -> Result<()> {
        admin::validate_password_change(current, new, confirm)?;
        self.api.change_password(current, new).await?;
        self.spaces.clear();
        self.navigator.redirect_to_login();
        Ok(())
    }

    // ── Spaces ───────────────────────────────────────────────────────

    /// Look a space up in the cache, loading the cache first if needed.
    pub async fn space(&self, space_id: &str) -> Result<Space> {
        self.spaces.load_spaces().await?;
        self.spaces
            .get_space(space_id)
            .ok_or_else(|| ClientError::NotFound(format!("Space '{space_id}'")))
    }

    pub async fn create_space(&self, id: &str, name: &str) -> Result<()> {
        admin::validate_new_space(id, name)?;
        self.api.create_space(id, name.trim()).await?;
        self.spaces.refresh_spaces().await
    }

    /// Replace the list columns from comma-separated input.
    pub async fn set_list_fields(&self, space_id: &str, input: &str) -> Result<Vec<String>> {
        let names = admin::parse_name_list(input);
        self.api.update_list_fields(space_id, names.clone()).await?;
        self.spaces.refresh_spaces().await?;
        Ok(names)
    }

    pub async fn set_hidden_create_fields(
        &self,
        space_id: &str,
        input: &str,
    ) -> Result<Vec<String>> {
        let names = admin::parse_name_list(input);
        self.api
            .update_hidden_create_fields(space_id, names.clone())
            .await?;
        self.spaces.refresh_spaces().await?;
        Ok(names)
    }

    /// Validate and save a template. Blank input clears it.
    pub async fn set_template(
        &self,
        space_id: &str,
        kind: TemplateKind,
        input: &str,
    ) -> Result<Option<String>> {
        let template = admin::prepare_template(&self.templates, input)?;
        self.api
            .update_template(space_id, kind, template.clone())
            .await?;
        self.spaces.refresh_spaces().await?;
        Ok(template)
    }

    pub async fn create_filter(&self, space_id: &str, draft: &FilterDraft) -> Result<Filter> {
        let space = self.space(space_id).await?;
        let filter = draft.build(&space)?;
        self.api.create_filter(space_id, &filter).await?;
        self.spaces.refresh_spaces().await?;
        Ok(filter)
    }

    pub async fn delete_filter(&self, space_id: &str, filter_id: &str) -> Result<()> {
        self.api.delete_filter(space_id, filter_id).await?;
        self.spaces.refresh_spaces().await
    }

    pub async fn export_space(&self, space_id: &str, include_content: bool) -> Result<ExportData> {
        self.api.export_space(space_id, include_content).await
    }

    pub async fn import_space(&self, data: &ExportData) -> Result<ImportResult> {
        let result = self.api.import_space(data).await?;
        self.spaces.refresh_spaces().await?;
        self.spaces.load_spaces().await?;
        Ok(result)
    }

    // ── Notes ────────────────────────────────────────────────────────

    /// Page size for a space: the config override or the space default,
    /// capped at the space maximum.
    pub fn page_size_for(&self, space: &Space) -> u32 {
        self.config
            .default_page_size
            .unwrap_or(space.default_page_size)
            .clamp(1, space.max_page_size.max(1))
    }

    pub fn notes_controller(&self, space: &Space) -> NotesController {
        NotesController::new(self.api.clone(), space.id.clone())
            .with_page_size(Some(self.page_size_for(space)))
    }
}
