use serde_json::json;
use spacenote_core::admin::{ConditionDraft, FilterDraft};
use spacenote_core::form::NoteForm;
use spacenote_core::{AppContext, ClientConfig, ClientError, Route, TemplateKind};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn context(server: &MockServer) -> AppContext {
    AppContext::in_memory(ClientConfig::default().with_api_url(server.uri())).unwrap()
}

fn space_json() -> serde_json::Value {
    json!({
        "id": "tasks",
        "name": "Tasks",
        "members": ["alice"],
        "fields": [
            { "name": "title", "type": "string", "required": true },
            { "name": "priority", "type": "int" },
            { "name": "done", "type": "boolean" }
        ],
        "list_fields": ["title"],
        "hidden_create_fields": [],
        "filters": []
    })
}

#[tokio::test]
async fn test_login_stores_session_and_attaches_header() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(json!({ "username": "alice", "password": "secret" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "session_id": "s1", "user_id": "alice" })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .and(header("X-Session-ID", "s1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "user": { "id": "alice" } })))
        .expect(1)
        .mount(&server)
        .await;

    let ctx = context(&server);
    let session = ctx.login("alice", "secret").await.unwrap();
    assert_eq!(session.session_id, "s1");
    assert!(ctx.is_authenticated());
    assert_eq!(ctx.navigator.current(), Route::Home);

    let me = ctx.api.me().await.unwrap();
    assert_eq!(me.unwrap().id, "alice");
}

#[tokio::test]
async fn test_invalid_login_leaves_state_alone() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "detail": "Invalid credentials" })))
        .mount(&server)
        .await;

    let ctx = context(&server);
    ctx.navigate(Route::Login);
    let history_before = ctx.navigator.history().len();

    let err = ctx.login("alice", "wrong").await.unwrap_err();
    assert!(matches!(err, ClientError::InvalidCredentials(ref msg) if msg == "Invalid credentials"));
    assert!(!ctx.is_authenticated());
    assert_eq!(ctx.navigator.history().len(), history_before);
}

#[tokio::test]
async fn test_any_401_logs_out_and_redirects() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/notes"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "detail": "Not authenticated" })))
        .expect(1)
        .mount(&server)
        .await;

    let ctx = context(&server);
    ctx.session.login("s1", "alice");
    ctx.navigate(Route::notes("tasks"));

    let err = ctx
        .api
        .list_notes("tasks", &Default::default())
        .await
        .unwrap_err();
    assert!(err.is_session_expired());
    assert!(!ctx.is_authenticated());
    assert_eq!(ctx.navigator.current(), Route::Login);
}

#[tokio::test]
async fn test_error_detail_is_surfaced_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/spaces"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "detail": "Space 'tasks' already exists" })),
        )
        .mount(&server)
        .await;

    let ctx = context(&server);
    ctx.session.login("s1", "alice");
    let err = ctx.create_space("tasks", "Tasks").await.unwrap_err();
    assert_eq!(err.status(), Some(400));
    assert_eq!(err.to_string(), "Space 'tasks' already exists");
    assert!(ctx.is_authenticated());
}

#[tokio::test]
async fn test_client_side_validation_blocks_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/spaces"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let ctx = context(&server);
    let err = ctx.create_space("Bad Id", "Tasks").await.unwrap_err();
    assert!(matches!(err, ClientError::Validation(_)));
}

#[tokio::test]
async fn test_network_failure_is_distinguished() {
    let ctx = AppContext::in_memory(ClientConfig::default().with_api_url("http://127.0.0.1:9/api"))
        .unwrap();
    ctx.session.login("s1", "alice");

    let err = ctx.api.list_spaces().await.unwrap_err();
    assert!(err.is_network());
    assert!(ctx.is_authenticated());
}

#[tokio::test]
async fn test_double_load_spaces_fetches_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/spaces"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([space_json()])))
        .expect(1)
        .mount(&server)
        .await;

    let ctx = context(&server);
    let (a, b) = tokio::join!(ctx.spaces.load_spaces(), ctx.spaces.load_spaces());
    a.unwrap();
    b.unwrap();
    ctx.spaces.load_spaces().await.unwrap();

    assert_eq!(ctx.space("tasks").await.unwrap().name, "Tasks");
    assert!(matches!(ctx.space("other").await, Err(ClientError::NotFound(_))));
}

#[tokio::test]
async fn test_mutations_refresh_space_cache() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/spaces"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([space_json()])))
        .expect(3)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/spaces/tasks/list-fields"))
        .and(body_json(json!({ "field_names": ["title", "priority"] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/spaces/tasks/note-list-template"))
        .and(body_json(json!({ "template": null })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let ctx = context(&server);
    ctx.session.login("s1", "alice");
    ctx.spaces.load_spaces().await.unwrap();

    let names = ctx.set_list_fields("tasks", "title, priority,").await.unwrap();
    assert_eq!(names, ["title", "priority"]);
    let saved = ctx
        .set_template("tasks", TemplateKind::NoteList, "   ")
        .await
        .unwrap();
    assert_eq!(saved, None);
}

#[tokio::test]
async fn test_invalid_template_is_not_saved() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/spaces/tasks/note-detail-template"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let ctx = context(&server);
    let err = ctx
        .set_template("tasks", TemplateKind::NoteDetail, "{{ note.id | bogus }}")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("bogus"));
}

#[tokio::test]
async fn test_create_filter_sends_coerced_conditions() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/spaces"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([space_json()])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/spaces/tasks/filters"))
        .and(body_json(json!({
            "id": "urgent",
            "title": "Urgent",
            "description": "",
            "conditions": [
                { "field": "priority", "operator": "gte", "value": 3 },
                { "field": "done", "operator": "eq", "value": false }
            ],
            "sort": ["-created_at"],
            "list_fields": []
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let ctx = context(&server);
    let draft = FilterDraft {
        id: "urgent".into(),
        title: "Urgent".into(),
        conditions: vec![
            ConditionDraft::parse("priority:gte:3").unwrap(),
            ConditionDraft::parse("done:eq:false").unwrap(),
        ],
        sort: "-created_at".into(),
        ..FilterDraft::default()
    };
    let filter = ctx.create_filter("tasks", &draft).await.unwrap();
    assert_eq!(filter.conditions.len(), 2);
}

#[tokio::test]
async fn test_create_note_payload_is_stringified() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/spaces"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([space_json()])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/notes"))
        .and(query_param("space_id", "tasks"))
        .and(body_json(json!({
            "fields": { "title": "Buy milk", "priority": "2", "done": "false" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1,
            "author": "alice",
            "created_at": "2025-01-01T00:00:00",
            "fields": { "title": "Buy milk", "priority": 2, "done": false }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let ctx = context(&server);
    let space = ctx.space("tasks").await.unwrap();
    let mut form = NoteForm::create(&space);
    form.set_value("title", "Buy milk").unwrap();
    form.set_value("priority", "2").unwrap();

    let note = ctx
        .api
        .create_note(&space.id, form.submit().unwrap())
        .await
        .unwrap();
    assert_eq!(note.id, 1);
}

#[tokio::test]
async fn test_notes_controller_requests_pages() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/notes"))
        .and(query_param("space_id", "tasks"))
        .and(query_param("filter_id", "open"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "notes": [],
            "total_count": 25,
            "current_page": 1,
            "page_size": 20,
            "total_pages": 2,
            "has_next": true,
            "has_prev": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    let ctx = context(&server);
    let space: spacenote_models::Space = serde_json::from_value(space_json()).unwrap();
    let mut controller = ctx.notes_controller(&space);
    let page = controller.select_filter(Some("open".into())).await.unwrap();
    assert!(page.has_next);
    assert!(!page.has_prev);
}

#[tokio::test]
async fn test_logout_is_best_effort() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/logout"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "detail": "boom" })))
        .expect(1)
        .mount(&server)
        .await;

    let ctx = context(&server);
    ctx.session.login("s1", "alice");
    assert!(!ctx.logout().await);
    assert!(!ctx.is_authenticated());
    assert_eq!(ctx.navigator.current(), Route::Login);
}

#[tokio::test]
async fn test_logout_reports_server_confirmation() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/logout"))
        .and(header("X-Session-ID", "s1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    let ctx = context(&server);
    ctx.session.login("s1", "alice");
    assert!(ctx.logout().await);
    assert!(!ctx.is_authenticated());

    // Without a session there is nothing to tell the server.
    assert!(!ctx.logout().await);
}

#[tokio::test]
async fn test_get_space_reads_one_space_without_the_cache() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/spaces/tasks"))
        .and(header("X-Session-ID", "s1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(space_json()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/spaces"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let ctx = context(&server);
    ctx.session.login("s1", "alice");
    let space = ctx.api.get_space("tasks").await.unwrap();
    assert_eq!(space.name, "Tasks");
    assert_eq!(space.fields.len(), 3);
    assert!(ctx.spaces.get_space("tasks").is_none());
}

#[tokio::test]
async fn test_change_password_forces_relogin() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/change-password"))
        .and(body_json(json!({ "current_password": "old", "new_password": "newer" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let ctx = context(&server);
    ctx.session.login("s1", "alice");
    assert!(ctx.change_password("old", "abc", None).await.is_err());
    assert!(ctx.is_authenticated());

    ctx.change_password("old", "newer", Some("newer")).await.unwrap();
    assert!(!ctx.is_authenticated());
    assert_eq!(ctx.navigator.current(), Route::Login);
}
