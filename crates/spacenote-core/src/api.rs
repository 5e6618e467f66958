//! HTTP client for the SpaceNote backend.
//!
//! Every request carries the session id header when a session exists. Any 401
//! response clears the session and redirects the navigator to `/login`, no
//! matter which call triggered it; the failed call is not retried. Other
//! non-2xx responses surface the backend's `detail` message verbatim.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

use spacenote_models::{
    ChangePasswordRequest, Comment, CreateCommentRequest, CreateSpaceRequest, CreateUserRequest,
    ExportData, FieldNamesRequest, Filter, ImportResult, LoginRequest, LoginResponse,
    LogoutResponse, MeResponse, Note, NoteFieldsRequest, NotesPage, Space, TemplateRequest, User,
};

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::routes::Navigator;
use crate::session::{Session, SessionStore};

/// Parameters of a notes listing request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotesQuery {
    pub filter_id: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

/// Which template of a space an update targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    NoteDetail,
    NoteList,
}

impl TemplateKind {
    fn endpoint(self) -> &'static str {
        match self {
            TemplateKind::NoteDetail => "note-detail-template",
            TemplateKind::NoteList => "note-list-template",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base: Url,
    session_header: String,
    session: Arc<SessionStore>,
    navigator: Arc<Navigator>,
}

impl ApiClient {
    pub fn new(
        config: &ClientConfig,
        session: Arc<SessionStore>,
        navigator: Arc<Navigator>,
    ) -> Result<Self> {
        let base = parse_base_url(&config.api_url)?;
        let http = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(concat!("spacenote/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ClientError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base,
            session_header: config.session_header.clone(),
            session,
            navigator,
        })
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    // ── Auth ─────────────────────────────────────────────────────────

    /// Exchange credentials for a session and store it.
    ///
    /// A rejected login leaves the session store untouched and does not
    /// trigger the expired-session redirect.
    pub async fn login(&self, username: &str, password: &str) -> Result<Session> {
        let body = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let response = self
            .request(Method::POST, "auth/login")?
            .json(&body)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let status = response.status();
        debug!(status = status.as_u16(), "POST auth/login");
        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::BAD_REQUEST) {
            return Err(ClientError::InvalidCredentials(error_detail(response).await));
        }
        if !status.is_success() {
            return Err(ClientError::Api {
                status: status.as_u16(),
                detail: error_detail(response).await,
            });
        }

        let login: LoginResponse = decode(response).await?;
        let user_id = login
            .resolved_user_id()
            .map(str::to_string)
            .unwrap_or_else(|| username.to_string());
        self.session.login(login.session_id.clone(), user_id.clone());

        Ok(Session {
            session_id: login.session_id,
            user_id,
        })
    }

    /// End the session. The network call is best effort; the local session
    /// is cleared whatever happens to it. Returns whether the backend
    /// confirmed the logout.
    pub async fn logout(&self) -> bool {
        let mut confirmed = false;
        if self.session.is_authenticated() {
            let result = match self.request(Method::POST, "auth/logout") {
                Ok(request) => self.fetch::<LogoutResponse>(request).await,
                Err(e) => Err(e),
            };
            match result {
                Ok(response) => confirmed = response.success,
                Err(e) => {
                    warn!(error = %e, "Logout request failed, clearing local session anyway");
                }
            }
        }
        self.session.logout();
        confirmed
    }

    pub async fn me(&self) -> Result<Option<User>> {
        let me: MeResponse = self.fetch(self.request(Method::GET, "auth/me")?).await?;
        Ok(me.user)
    }

    /// Change the password. The backend invalidates every session, so the
    /// local one is dropped on success.
    pub async fn change_password(&self, current_password: &str, new_password: &str) -> Result<()> {
        let body = ChangePasswordRequest {
            current_password: current_password.to_string(),
            new_password: new_password.to_string(),
        };
        self.send_json(Method::POST, "auth/change-password", &body)
            .await?;
        self.session.logout();
        Ok(())
    }

    // ── Spaces ───────────────────────────────────────────────────────

    pub async fn list_spaces(&self) -> Result<Vec<Space>> {
        self.fetch(self.request(Method::GET, "spaces")?).await
    }

    pub async fn get_space(&self, space_id: &str) -> Result<Space> {
        self.fetch(self.request(Method::GET, &format!("spaces/{space_id}"))?)
            .await
    }

    pub async fn create_space(&self, id: &str, name: &str) -> Result<()> {
        let body = CreateSpaceRequest {
            id: id.to_string(),
            name: name.to_string(),
        };
        self.send_json(Method::POST, "spaces", &body).await
    }

    pub async fn update_list_fields(&self, space_id: &str, field_names: Vec<String>) -> Result<()> {
        self.send_json(
            Method::PUT,
            &format!("spaces/{space_id}/list-fields"),
            &FieldNamesRequest { field_names },
        )
        .await
    }

    pub async fn update_hidden_create_fields(
        &self,
        space_id: &str,
        field_names: Vec<String>,
    ) -> Result<()> {
        self.send_json(
            Method::PUT,
            &format!("spaces/{space_id}/hidden-create-fields"),
            &FieldNamesRequest { field_names },
        )
        .await
    }

    pub async fn update_template(
        &self,
        space_id: &str,
        kind: TemplateKind,
        template: Option<String>,
    ) -> Result<()> {
        self.send_json(
            Method::PUT,
            &format!("spaces/{space_id}/{}", kind.endpoint()),
            &TemplateRequest { template },
        )
        .await
    }

    pub async fn create_filter(&self, space_id: &str, filter: &Filter) -> Result<()> {
        self.send_json(Method::POST, &format!("spaces/{space_id}/filters"), filter)
            .await
    }

    pub async fn delete_filter(&self, space_id: &str, filter_id: &str) -> Result<()> {
        let request = self.request(
            Method::DELETE,
            &format!("spaces/{space_id}/filters/{filter_id}"),
        )?;
        self.execute(request).await.map(|_| ())
    }

    pub async fn export_space(&self, space_id: &str, include_content: bool) -> Result<ExportData> {
        let request = self
            .request(Method::GET, &format!("spaces/{space_id}/export"))?
            .query(&[("include_content", include_content)]);
        self.fetch(request).await
    }

    pub async fn import_space(&self, data: &ExportData) -> Result<ImportResult> {
        self.fetch(self.request(Method::POST, "import")?.json(data))
            .await
    }

    // ── Notes ────────────────────────────────────────────────────────

    pub async fn list_notes(&self, space_id: &str, query: &NotesQuery) -> Result<NotesPage> {
        let mut params: Vec<(&str, String)> = vec![("space_id", space_id.to_string())];
        if let Some(filter_id) = &query.filter_id {
            params.push(("filter_id", filter_id.clone()));
        }
        if let Some(page) = query.page {
            params.push(("page", page.to_string()));
        }
        if let Some(page_size) = query.page_size {
            params.push(("page_size", page_size.to_string()));
        }
        self.fetch(self.request(Method::GET, "notes")?.query(&params))
            .await
    }

    pub async fn get_note(&self, space_id: &str, note_id: i64) -> Result<Note> {
        let request = self
            .request(Method::GET, &format!("notes/{note_id}"))?
            .query(&[("space_id", space_id)]);
        self.fetch(request).await
    }

    pub async fn create_note(
        &self,
        space_id: &str,
        fields: BTreeMap<String, String>,
    ) -> Result<Note> {
        let request = self
            .request(Method::POST, "notes")?
            .query(&[("space_id", space_id)])
            .json(&NoteFieldsRequest { fields });
        self.fetch(request).await
    }

    pub async fn update_note(
        &self,
        space_id: &str,
        note_id: i64,
        fields: BTreeMap<String, String>,
    ) -> Result<Note> {
        let request = self
            .request(Method::PUT, &format!("notes/{note_id}"))?
            .query(&[("space_id", space_id)])
            .json(&NoteFieldsRequest { fields });
        self.fetch(request).await
    }

    // ── Comments ─────────────────────────────────────────────────────

    pub async fn list_comments(&self, space_id: &str, note_id: i64) -> Result<Vec<Comment>> {
        let request = self
            .request(Method::GET, "comments")?
            .query(&[("space_id", space_id.to_string()), ("note_id", note_id.to_string())]);
        self.fetch(request).await
    }

    pub async fn create_comment(
        &self,
        space_id: &str,
        note_id: i64,
        content: &str,
    ) -> Result<Comment> {
        let request = self
            .request(Method::POST, "comments")?
            .query(&[("space_id", space_id.to_string()), ("note_id", note_id.to_string())])
            .json(&CreateCommentRequest {
                content: content.to_string(),
            });
        self.fetch(request).await
    }

    // ── Users ────────────────────────────────────────────────────────

    pub async fn list_users(&self) -> Result<Vec<User>> {
        self.fetch(self.request(Method::GET, "users")?).await
    }

    pub async fn create_user(&self, username: &str, password: &str) -> Result<User> {
        let body = CreateUserRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        self.fetch(self.request(Method::POST, "users")?.json(&body))
            .await
    }

    // ── Plumbing ─────────────────────────────────────────────────────

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let url = self
            .base
            .join(path)
            .map_err(|e| ClientError::Config(format!("Invalid API path {path}: {e}")))?;
        let mut builder = self.http.request(method, url);
        if let Some(session_id) = self.session.session_id() {
            builder = builder.header(self.session_header.as_str(), session_id);
        }
        Ok(builder)
    }

    async fn execute(&self, builder: RequestBuilder) -> Result<Response> {
        let response = builder
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let status = response.status();
        debug!(url = %response.url(), status = status.as_u16(), "API response");

        if status == StatusCode::UNAUTHORIZED {
            warn!(url = %response.url(), "Session rejected by backend, logging out");
            self.session.logout();
            self.navigator.redirect_to_login();
            return Err(ClientError::SessionExpired);
        }

        if !status.is_success() {
            return Err(ClientError::Api {
                status: status.as_u16(),
                detail: error_detail(response).await,
            });
        }

        Ok(response)
    }

    async fn fetch<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = self.execute(builder).await?;
        decode(response).await
    }

    async fn send_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<()> {
        let request = self.request(method, path)?.json(body);
        self.execute(request).await.map(|_| ())
    }
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let mut normalized = raw.trim().to_string();
    if !normalized.ends_with('/') {
        normalized.push('/');
    }
    Url::parse(&normalized).map_err(|e| ClientError::Config(format!("Invalid API URL {raw}: {e}")))
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(e.to_string()))
}

/// Pull the backend's `detail` message out of an error response.
async fn error_detail(response: Response) -> String {
    let status = response.status();
    let fallback = status
        .canonical_reason()
        .unwrap_or("Request failed")
        .to_string();

    let Ok(body) = response.bytes().await else {
        return fallback;
    };

    match serde_json::from_slice::<Value>(&body) {
        Ok(Value::Object(map)) => match map.get("detail") {
            Some(Value::String(detail)) => detail.clone(),
            Some(other) if !other.is_null() => other.to_string(),
            _ => fallback,
        },
        _ => fallback,
    }
}

/// Source of the space list, implemented by [`ApiClient`].
#[async_trait]
pub trait SpaceSource: Send + Sync {
    async fn fetch_spaces(&self) -> Result<Vec<Space>>;
}

#[async_trait]
impl SpaceSource for ApiClient {
    async fn fetch_spaces(&self) -> Result<Vec<Space>> {
        self.list_spaces().await
    }
}

/// Source of note pages, implemented by [`ApiClient`].
#[async_trait]
pub trait NoteSource: Send + Sync {
    async fn fetch_notes(&self, space_id: &str, query: &NotesQuery) -> Result<NotesPage>;
}

#[async_trait]
impl NoteSource for ApiClient {
    async fn fetch_notes(&self, space_id: &str, query: &NotesQuery) -> Result<NotesPage> {
        self.list_notes(space_id, query).await
    }
}
